/// Errors raised by the samplers before any bucket work is done.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid threshold {0}: must be positive")]
    InvalidThreshold(usize),
    #[error("invalid bucket count {0}: must be positive")]
    InvalidBuckets(usize),
    #[error("no non-empty series to downsample")]
    NoSeries,
    #[error("unknown method {0:?}: expected lttb or minmax")]
    UnknownMethod(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
