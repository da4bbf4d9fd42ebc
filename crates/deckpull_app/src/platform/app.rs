use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use deck_logging::{deck_info, deck_warn};
use deckpull_core::{update, AppState, DownloadStatus, FileHandle, Msg, SessionState};

use super::cli::Cli;
use super::config;
use super::effects::EffectRunner;
use super::logging;
use super::render;

/// How long the loop waits for engine output before ticking.
const TICK: Duration = Duration::from_millis(75);

/// Processes every file on the command line in turn. Returns `true` when all of them completed.
pub fn run_app(cli: Cli) -> anyhow::Result<bool> {
    logging::initialize(cli.log, cli.verbose);

    let settings = config::resolve(&cli, config::load_file_config(&cli.config))?;
    deck_info!(
        "Starting deckpull against {} with {} file(s)",
        settings.engine.base_url,
        settings.files.len()
    );

    let runner =
        EffectRunner::new(settings.engine.clone()).context("could not start network engine")?;
    let state = AppState::new()
        .with_options(settings.options)
        .with_auto_download(settings.download);
    let mut session = Session {
        runner,
        state,
        last_frame: Vec::new(),
    };

    let mut completed = 0usize;
    for path in &settings.files {
        if session.process(path) {
            completed += 1;
        }
    }

    session.runner.shutdown();
    deck_info!("{} of {} file(s) completed", completed, settings.files.len());
    Ok(completed == settings.files.len())
}

struct Session {
    runner: EffectRunner,
    state: AppState,
    last_frame: Vec<String>,
}

impl Session {
    /// Selects, submits and follows one file, then clears the session for the next.
    fn process(&mut self, path: &Path) -> bool {
        let size_bytes = match fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => {
                eprintln!("{}: not a regular file", path.display());
                return false;
            }
            Err(err) => {
                deck_warn!("Cannot read {:?}: {}", path, err);
                eprintln!("{}: {}", path.display(), err);
                return false;
            }
        };
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.dispatch(Msg::FileChosen {
            name,
            size_bytes,
            handle: FileHandle::new(path),
        });
        if self.state.session() != SessionState::Selected {
            return false;
        }

        self.dispatch(Msg::SubmitClicked);
        while !self.settled() {
            let msg = self.runner.next_msg(TICK, &self.state);
            self.dispatch(msg);
        }

        let completed = self.state.session() == SessionState::Completed;
        let closing = match self.state.session() {
            SessionState::Completed | SessionState::Failed => Msg::ResultDismissed,
            _ => Msg::ResetClicked,
        };
        self.dispatch(closing);
        completed
    }

    /// True once no further engine output is expected for the current file.
    fn settled(&self) -> bool {
        match self.state.session() {
            SessionState::Submitting | SessionState::Monitoring => false,
            SessionState::Completed => {
                !matches!(self.state.download(), Some(DownloadStatus::Pending))
            }
            SessionState::Idle | SessionState::Selected | SessionState::Failed => true,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;

        for notice in self.runner.enqueue(effects) {
            eprintln!("deckpull: {notice}");
        }
        if was_dirty {
            self.draw(render::render(&view));
        }
    }

    fn draw(&mut self, frame: Vec<String>) {
        if frame.is_empty() || frame == self.last_frame {
            return;
        }
        // Lines already on screen from the previous frame are not repeated.
        let shared = frame
            .iter()
            .zip(&self.last_frame)
            .take_while(|(new, old)| new == old)
            .count();
        for line in &frame[shared..] {
            println!("{line}");
        }
        self.last_frame = frame;
    }
}
