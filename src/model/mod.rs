use thiserror::Error;

pub mod manifest;
pub mod module;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("{file}: content is not valid UTF-8")]
    Encoding { file: String },
    #[error("{file}:{line}: unknown directive `{verb}`")]
    UnknownDirective {
        file: String,
        line: usize,
        verb: String,
    },
    #[error("{file}:{line}: invalid `{verb}` directive: {reason}")]
    InvalidDirective {
        file: String,
        line: usize,
        verb: String,
        reason: String,
    },
    #[error("{file}:{line}: unterminated quoted string")]
    UnterminatedQuote { file: String, line: usize },
    #[error("{file}:{line}: `{verb}` block is never closed")]
    UnterminatedBlock {
        file: String,
        line: usize,
        verb: String,
    },
    #[error("{file}:{line}: unexpected `{token}`")]
    UnexpectedToken {
        file: String,
        line: usize,
        token: String,
    },
}
