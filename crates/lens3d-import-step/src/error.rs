use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StepError {
    #[error("record #{id}: {message}")]
    Syntax { id: u64, message: String },
    #[error("record #{0} is defined more than once")]
    DuplicateId(u64),
    #[error("unterminated {what} at end of file")]
    Unterminated { what: &'static str },
}
