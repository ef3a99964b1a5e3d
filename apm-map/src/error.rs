use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArgument,

    #[error("partition index out of range")]
    OutOfRange,

    #[error("block range conflicts with another partition or the end of the device")]
    Conflict,

    #[error("no valid partition map found")]
    Invalid,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("out of memory growing the partition map")]
    OutOfMemory,
}
