use std::io;
use std::path::{Path, PathBuf};

use deck_logging::deck_debug;
use tempfile::TempPath;
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {path:?} unusable: {message}")]
    OutputDir { path: PathBuf, message: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A document being received chunk by chunk.
///
/// Bytes go to a hidden `.part` file beside the target. The target name only
/// appears once [`PartialDownload::finish`] succeeds; dropping an unfinished
/// download deletes the part file.
pub struct PartialDownload {
    file: File,
    part: TempPath,
    target: PathBuf,
    received: u64,
}

impl PartialDownload {
    pub async fn begin(dir: &Path, filename: &str) -> Result<Self, PersistError> {
        prepare_dir(dir).await?;
        let (file, part) = tempfile::Builder::new()
            .prefix(".deckpull-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|err| PersistError::OutputDir {
                path: dir.to_path_buf(),
                message: err.to_string(),
            })?
            .into_parts();
        Ok(Self {
            file: File::from_std(file),
            part,
            target: dir.join(filename),
            received: 0,
        })
    }

    pub async fn append(&mut self, chunk: &[u8]) -> Result<(), PersistError> {
        self.file.write_all(chunk).await?;
        self.received += chunk.len() as u64;
        Ok(())
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    /// Flushes to disk and moves the part file onto the target, replacing an earlier copy.
    pub async fn finish(self) -> Result<PathBuf, PersistError> {
        let Self {
            mut file,
            part,
            target,
            received,
        } = self;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        if fs::try_exists(&target).await? {
            fs::remove_file(&target).await?;
        }
        part.persist(&target).map_err(|err| PersistError::Io(err.error))?;
        deck_debug!("Wrote {} bytes to {:?}", received, target);
        Ok(target)
    }
}

async fn prepare_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |message: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        message,
    };
    match fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(unusable("not a directory".to_string())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => fs::create_dir_all(dir)
            .await
            .map_err(|err| unusable(err.to_string())),
        Err(err) => Err(unusable(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn chunks_land_under_the_target_name_on_finish() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("downloads");

        let mut download = PartialDownload::begin(&dir, "deck.docx").await.unwrap();
        download.append(b"first ").await.unwrap();
        download.append(b"second").await.unwrap();
        assert_eq!(download.received(), 12);
        assert!(!dir.join("deck.docx").exists());

        let saved = download.finish().await.unwrap();
        assert_eq!(saved, dir.join("deck.docx"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"first second");
        assert_eq!(entries(&dir), vec!["deck.docx".to_string()]);
    }

    #[tokio::test]
    async fn finish_replaces_an_earlier_copy() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("deck.docx"), b"old").unwrap();

        let mut download = PartialDownload::begin(temp.path(), "deck.docx").await.unwrap();
        download.append(b"new").await.unwrap();
        let saved = download.finish().await.unwrap();

        assert_eq!(std::fs::read(saved).unwrap(), b"new");
    }

    #[tokio::test]
    async fn abandoned_download_leaves_nothing_behind() {
        let temp = TempDir::new().unwrap();
        let mut download = PartialDownload::begin(temp.path(), "deck.docx").await.unwrap();
        download.append(b"half a docu").await.unwrap();
        drop(download);

        assert!(entries(temp.path()).is_empty());
    }

    #[tokio::test]
    async fn refuses_a_file_as_output_dir() {
        let temp = TempDir::new().unwrap();
        let not_a_dir = temp.path().join("plain");
        std::fs::write(&not_a_dir, "x").unwrap();

        let err = PartialDownload::begin(&not_a_dir, "deck.docx").await.err();
        assert!(matches!(err, Some(PersistError::OutputDir { .. })));
    }
}
