use std::error::Error;
use std::fmt::{Display, Formatter};

/// Possible errors that arise due to issues with the input merge tree or the
/// member data passed to the labeler.
#[derive(Debug, Clone)]
pub enum TreecutError {
    EmptyTree,
    MalformedTree(String),
    LengthMismatch(String),
}

impl Error for TreecutError {}

impl Display for TreecutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            TreecutError::EmptyTree => String::from("The merge tree provided is empty"),
            TreecutError::MalformedTree(msg) => format!("Malformed merge tree: {msg}"),
            TreecutError::LengthMismatch(msg) => format!("Mismatched input lengths: {msg}"),
        };
        write!(f, "{message}")
    }
}
