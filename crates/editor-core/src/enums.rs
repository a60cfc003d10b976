/// How an edit places its bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// The staged bytes push everything after them to the right.
    Insert,
    /// Each staged byte replaces the byte that followed the edit position.
    Overwrite,
}

/// Published to listeners after every structural change to the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeEvent {
    Committed {
        /// Document offset the edit started at.
        offset: u64,
        /// Number of bytes the edit contributed.
        len: u64,
        kind: EditKind,
    },
    Undone {
        offset: u64,
    },
    Redone {
        offset: u64,
    },
    /// A staged edit was discarded before it was committed.
    Aborted {
        offset: u64,
    },
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum MathError {
    /// Wraps the specific error `TryInto` generates
    #[error("integer conversion failed: {0}")]
    ConversionFailed(#[from] std::num::TryFromIntError),
    /// Represents the `None` case from checked math
    #[error("arithmetic overflow")]
    Overflow,
    #[error("index out of bounds (len={0})")]
    OutOfBounds(usize),
}

/// `u64` document position to `usize` memory index.
#[inline]
pub(crate) fn to_usize(value: u64) -> Result<usize, MathError> {
    Ok(<u64 as TryInto<usize>>::try_into(value)?)
}

/// `usize` memory length to `u64` document length.
#[inline]
pub(crate) fn to_u64(value: usize) -> Result<u64, MathError> {
    Ok(<usize as TryInto<u64>>::try_into(value)?)
}
