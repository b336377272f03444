use std::path::PathBuf;

use crate::str_interp::InterpError;

#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("Language not supported: {path:?} (No language is registered for extension {ext:?})")]
    LanguageNotSupported { path: PathBuf, ext: Option<String> },

    #[error("No testcases to judge")]
    NoTestcases,

    #[error("Invalid command template: {0}")]
    Template(#[from] InterpError),
}
