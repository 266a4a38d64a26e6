use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

use crate::env::LoadedEnv;
use crate::error::Error;
use crate::model::{Entry, Inference, LoadReport};
use crate::parser::{decode, parse_str_with_source};

const DEFAULT_FILE: &str = ".env";

/// Load `.env` from the current working directory.
pub fn dotenv() -> Result<LoadedEnv, Error> {
    from_path(DEFAULT_FILE)
}

/// Load a single dotenv file.
pub fn from_path(path: impl AsRef<Path>) -> Result<LoadedEnv, Error> {
    EnvLoader::new().path(path).load()
}

/// Load several dotenv files; later files win on key collisions.
pub fn from_paths<I, P>(paths: I) -> Result<LoadedEnv, Error>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    EnvLoader::new().paths(paths).load()
}

/// Builder-style dotenv loader.
///
/// Files are read concurrently and merged in the order they were added. A
/// single unreadable file fails the whole load.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    paths: Vec<PathBuf>,
    inference: Inference,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.paths
            .extend(paths.into_iter().map(|path| path.as_ref().to_path_buf()));
        self
    }

    pub fn inference(mut self, inference: impl Into<Inference>) -> Self {
        self.inference = inference.into();
        self
    }

    /// Read, parse and merge every file, keeping typed values and their origin.
    pub fn parse_only(&self) -> Result<Vec<Entry>, Error> {
        let (entries, _) = self.collect_entries()?;
        Ok(entries)
    }

    pub fn load(&self) -> Result<LoadedEnv, Error> {
        let (entries, report) = self.collect_entries()?;
        Ok(LoadedEnv::from_entries(entries, report))
    }

    /// Async counterpart of [`EnvLoader::load`] backed by `tokio::fs`.
    #[cfg(feature = "async")]
    pub async fn load_async(&self) -> Result<LoadedEnv, Error> {
        let reads = self.effective_paths().into_iter().map(|path| async move {
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|source| Error::unreadable(&path, source))?;
            Ok::<_, Error>(self.parse_file(&path, &bytes))
        });
        let parsed = futures::future::try_join_all(reads).await?;

        let (entries, report) = merge(parsed);
        Ok(LoadedEnv::from_entries(entries, report))
    }

    fn collect_entries(&self) -> Result<(Vec<Entry>, LoadReport), Error> {
        let paths = self.effective_paths();
        let parsed = std::thread::scope(|scope| {
            let handles: Vec<_> = paths
                .iter()
                .map(|path| scope.spawn(move || self.read_file(path)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect::<Result<Vec<_>, Error>>()
        })?;

        Ok(merge(parsed))
    }

    fn read_file(&self, path: &Path) -> Result<Vec<Entry>, Error> {
        let bytes = std::fs::read(path).map_err(|source| Error::unreadable(path, source))?;
        Ok(self.parse_file(path, &bytes))
    }

    fn parse_file(&self, path: &Path, bytes: &[u8]) -> Vec<Entry> {
        let content = decode(bytes);
        if matches!(content, Cow::Owned(_)) {
            warn!(path = %path.display(), "file is not valid UTF-8; invalid bytes were replaced");
        }

        let entries = parse_str_with_source(&content, Some(path), self.inference);
        debug!(
            path = %path.display(),
            entries = entries.len(),
            inference = self.inference.is_enabled(),
            "parsed dotenv file"
        );
        entries
    }

    fn effective_paths(&self) -> Vec<PathBuf> {
        if self.paths.is_empty() {
            vec![PathBuf::from(DEFAULT_FILE)]
        } else {
            self.paths.clone()
        }
    }
}

/// Fold per-file entries left to right; a later file replaces earlier values
/// but keeps the key's original position.
fn merge(parsed: Vec<Vec<Entry>>) -> (Vec<Entry>, LoadReport) {
    let mut merged_entries = Vec::new();
    let mut by_key = HashMap::<String, usize>::new();
    let mut report = LoadReport {
        files_read: parsed.len(),
        ..LoadReport::default()
    };

    for entries in parsed {
        report.entries_parsed += entries.len();
        for entry in entries {
            if let Some(existing_idx) = by_key.get(&entry.key).copied() {
                trace!(key = %entry.key, "overridden by later file");
                report.overridden += 1;
                merged_entries[existing_idx] = entry;
            } else {
                by_key.insert(entry.key.clone(), merged_entries.len());
                merged_entries.push(entry);
            }
        }
    }

    debug!(
        files = report.files_read,
        keys = merged_entries.len(),
        overridden = report.overridden,
        "merged dotenv files"
    );
    (merged_entries, report)
}
