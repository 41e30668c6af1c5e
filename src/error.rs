use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error taxonomy for the MinSort engine: I/O failures on read or write,
/// configuration errors detected eagerly before any I/O runs, and
/// invariant violations that indicate a bug (a region-index entry that
/// does not agree with the region's actual contents).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("short read of input page {page}: expected {expected} bytes")]
    ShortRead { page: usize, expected: usize },

    #[error("short write of output page {block_index}")]
    ShortWrite { block_index: u32 },

    #[error("invalid sort configuration: {0}")]
    Config(String),

    #[error(
        "invariant violation: region {region} claimed minimum {expected} but no record equal \
         to it could be located; init and the iterator likely disagree on key extraction"
    )]
    InvariantViolation { region: usize, expected: i32 },
}

impl Error {
    /// Maps an error to the process exit code described in the external
    /// interface: `9` for an output write failure, `1` for everything else
    /// that prevented a successful sort. `0` (success) is not representable
    /// here — it is the absence of an `Error`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ShortWrite { .. } => 9,
            _ => 1,
        }
    }
}
