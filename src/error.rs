use std::path::PathBuf;

/// Errors produced while loading dotenv input.
///
/// Parsing itself never fails; only reading the input can.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A dotenv file could not be read. Aborts the whole load.
    #[error("failed to read `{}`", path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read dotenv input")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            source,
        }
    }

    /// Path of the file that failed to load, if the error is tied to one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::UnreadableFile { path, .. } => Some(path),
            Self::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_file_names_the_path() {
        let err = Error::unreadable(
            "/tmp/missing.env",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );

        assert_eq!(err.path(), Some(std::path::Path::new("/tmp/missing.env")));
        assert_eq!(err.to_string(), "failed to read `/tmp/missing.env`");
        assert!(std::error::Error::source(&err).is_some());
    }
}
