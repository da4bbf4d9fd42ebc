use deckpull_core::{AppViewModel, SessionState};

const BAR_WIDTH: usize = 30;

/// Turns a view model into terminal lines. An empty frame means nothing to show.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let name = view
        .file
        .as_ref()
        .map(|file| format!("{} ({})", file.name, file.size_label));

    let mut lines = Vec::new();
    match view.session {
        SessionState::Idle => {}
        SessionState::Selected => {
            if let Some(name) = name {
                lines.push(format!("Selected {name}"));
            }
        }
        SessionState::Submitting => {
            if let Some(name) = name {
                lines.push(format!("Uploading {name}"));
            }
        }
        SessionState::Monitoring => {
            if let Some(progress) = &view.progress {
                lines.push(progress_line(progress.percent, &progress.label));
            }
        }
        SessionState::Completed => {
            if let Some(result) = &view.result {
                lines.push("Extraction complete".to_string());
                lines.push(format!("  Slides:      {}", result.total_slides));
                lines.push(format!("  Text blocks: {}", result.text_blocks));
                lines.push(format!("  File size:   {}", result.file_size));
                lines.push(format!("  Download:    {}", result.download_url));
                if result.download_pending {
                    lines.push("  Saving...".to_string());
                }
                if let Some(path) = &result.saved_to {
                    lines.push(format!("  Saved to:    {}", path.display()));
                }
            }
        }
        SessionState::Failed => match name {
            Some(name) => lines.push(format!("Failed {name}")),
            None => lines.push("Failed".to_string()),
        },
    }
    lines
}

fn progress_line(percent: u32, label: &str) -> String {
    let percent = percent.min(100);
    let filled = BAR_WIDTH * percent as usize / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent,
        label
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckpull_core::{FileView, ProgressView, ResultSummary, ResultView};
    use pretty_assertions::assert_eq;

    #[test]
    fn progress_bar_is_clamped() {
        let line = progress_line(250, "Writing document");
        assert!(line.starts_with(&format!("[{}]", "#".repeat(BAR_WIDTH))));
        assert!(line.ends_with("100% Writing document"));

        let half = progress_line(50, "50%");
        assert_eq!(half.matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn completed_view_shows_dash_for_missing_text_blocks() {
        let summary = ResultSummary {
            total_slides: 12,
            text_blocks: None,
            file_size: "48.2 KB".to_string(),
            download_url: "/download/deck.docx".to_string(),
        };
        let view = AppViewModel {
            session: SessionState::Completed,
            result: Some(ResultView::present(&summary)),
            ..AppViewModel::default()
        };
        assert_eq!(
            render(&view),
            vec![
                "Extraction complete".to_string(),
                "  Slides:      12".to_string(),
                "  Text blocks: -".to_string(),
                "  File size:   48.2 KB".to_string(),
                "  Download:    /download/deck.docx".to_string(),
            ]
        );
    }

    #[test]
    fn monitoring_renders_the_progress_label() {
        let view = AppViewModel {
            session: SessionState::Monitoring,
            file: Some(FileView {
                name: "deck.pptx".to_string(),
                size_label: "1 KB".to_string(),
            }),
            progress: Some(ProgressView {
                percent: 40,
                label: "Parsing slide 4".to_string(),
            }),
            ..AppViewModel::default()
        };
        let lines = render(&view);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with(" 40% Parsing slide 4"));
    }

    #[test]
    fn idle_renders_nothing() {
        assert!(render(&AppViewModel::default()).is_empty());
    }
}
