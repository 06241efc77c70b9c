use thiserror::Error;

/// Errors raised while compiling a contended memory script.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unexpected character '{ch}' at position {pos} in script \"{script}\"")]
    UnexpectedChar {
        ch: char,
        pos: usize,
        script: String,
    },
    #[error("too many elements in script \"{script}\" (maximum is {max})")]
    TooManyElements { script: String, max: usize },
    #[error("element left unfinished at position {pos} in script \"{script}\"")]
    IncompleteElement { pos: usize, script: String },
    #[error("IO cycles need an access slot as their source (script \"{script}\")")]
    IoSource { script: String },
}

/// Errors raised while validating a [`ContentionConfig`](crate::config::ContentionConfig).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ULA delay sequence must be 8 numeric digits in length (got \"{0}\")")]
    DelayPatternLength(String),
    #[error("bad character '{ch}' in ULA delay sequence \"{pattern}\"")]
    DelayPatternChar { ch: char, pattern: String },
    #[error("bad character '{ch}' in contended banks \"{banks}\"")]
    ContendedBankChar { ch: char, banks: String },
    #[error("{0} must be greater than zero")]
    ZeroGeometry(&'static str),
    #[error(transparent)]
    Script(#[from] ScriptError),
}
