//! Parse and merge dotenv files into an environment for a child process.
//!
//! Parsing is total: any input yields a (possibly empty) list of entries and
//! malformed lines are skipped. With [`Inference::Enabled`], numeric and
//! boolean looking values become typed [`Value`]s.
//!
//! [`EnvLoader::load`] reads several files concurrently, merges them in order
//! (later files win) and returns a string-only [`LoadedEnv`]. The process
//! environment is never modified.

mod env;
mod error;
mod loader;
mod model;
mod parser;
mod value;

pub use env::LoadedEnv;
pub use error::Error;
pub use loader::{EnvLoader, dotenv, from_path, from_paths};
pub use model::{Entry, Inference, LoadReport};
pub use parser::{
    parse_bytes, parse_bytes_with_mode, parse_reader, parse_reader_with_mode, parse_str,
    parse_str_with_mode,
};
pub use value::Value;
