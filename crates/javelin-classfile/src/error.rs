use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    InvalidDescriptor(String),
    InvalidBootstrapIndex(u16),
    Other(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDescriptor(desc) => write!(f, "invalid descriptor: {desc}"),
            Error::InvalidBootstrapIndex(index) => {
                write!(f, "invalid bootstrap method index: {index}")
            }
            Error::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}
