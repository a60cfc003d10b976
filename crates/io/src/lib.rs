//! Bytes at rest: the read-only original a document is opened from and the
//! destination it is written back to. Nothing in here knows about edits.
pub mod mmap;
pub mod save;
pub mod source;
