use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Config Error - {0}")]
    Config(String),

    #[error("Encode Error - {0}")]
    Encode(String),

    #[error("Sink Error - {0}")]
    Sink(String),
}

impl From<kinesis_stream::Error> for Error {
    fn from(value: kinesis_stream::Error) -> Self {
        match value {
            kinesis_stream::Error::InvalidConfig(e) => Error::Config(e),
            kinesis_stream::Error::Kinesis(e) => Error::Sink(e),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(value: config::ConfigError) -> Self {
        Error::Config(value.to_string())
    }
}
