use std::error;
use std::fmt::{self, Display, Formatter};
use std::io;

/// The result given after a parsing operation.
pub type ParseResult<T> = Result<T, ParseError>;

/// The error type returned when parsing tags.
#[derive(Debug)]
pub enum ParseError {
    /// Generic IO errors. This either means that a problem occurred while
    /// opening the file for a tag, or an unexpected EOF was encountered while
    /// parsing.
    IoError(io::Error),
    /// A part of the tag was not valid.
    MalformedData,
    /// The tag or an element of the tag is unsupported.
    Unsupported,
    /// The tag was not found in the given file. This is an expected outcome
    /// for files without metadata, not a failure.
    NotFound,
}

impl From<io::Error> for ParseError {
    fn from(other: io::Error) -> Self {
        ParseError::IoError(other)
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::IoError(err) => err.fmt(f),
            Self::MalformedData => write![f, "malformed data"],
            Self::Unsupported => write![f, "unsupported"],
            Self::NotFound => write![f, "not found"],
        }
    }
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        let error = match self {
            Self::IoError(err) => err,
            _ => return None,
        };

        Some(error)
    }
}
