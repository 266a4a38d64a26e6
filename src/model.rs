use std::path::PathBuf;

use crate::value::Value;

/// A parsed `KEY=VALUE` record from a dotenv file or input buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub value: Value,
    pub source: Option<PathBuf>,
    /// 1-based line where the record starts.
    pub line: u32,
}

/// Summary of a load operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub files_read: usize,
    /// Records parsed across all files, after per-file duplicate collapsing.
    pub entries_parsed: usize,
    /// Keys whose value was replaced by a later file.
    pub overridden: usize,
}

/// Type inference behavior for parsed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inference {
    /// Every value stays a string.
    #[default]
    Disabled,
    /// Numeric-looking values become numbers, `true`/`false` become booleans.
    Enabled,
}

impl Inference {
    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

impl From<bool> for Inference {
    fn from(value: bool) -> Self {
        if value { Self::Enabled } else { Self::Disabled }
    }
}
