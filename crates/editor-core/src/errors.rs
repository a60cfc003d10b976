pub type EditResult<T> = Result<T, EditError>;

/// Failures of the edit session state machine.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("an edit is already in progress; commit or abort it first")]
    EditInProgress,
    #[error("no edit is in progress")]
    NoEditInProgress,
    #[error("offset {offset} is past the end of the document (len={len})")]
    OutOfBounds { offset: u64, len: u64 },
    #[error(transparent)]
    Math(#[from] crate::enums::MathError),
}

/// Rejected search input. A search that fails here has not scanned anything.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("search pattern is empty")]
    EmptyPattern,
    #[error("`{text}` is not a hexadecimal byte sequence")]
    InvalidHex { text: String },
    #[error("`{text}` has an odd number of hex digits")]
    OddNibbles { text: String },
    #[error("`{text}` is not a number")]
    InvalidNumber { text: String },
    #[error("`{text}` does not fit in {bits} bits")]
    ValueOutOfRange { text: String, bits: u32 },
    #[error(transparent)]
    Math(#[from] crate::enums::MathError),
}
