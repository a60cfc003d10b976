/// # Piece Table Module.
///
/// The document is an ordered list of pieces, each a window into either the
/// original bytes, the append-only added buffer, or the staging bytes of the
/// edit currently being typed. Pieces are referred to by stable handles so
/// that history records survive later splits and joins.
pub mod arena;
pub mod piece;
pub mod table;

/// Bytes reserved for the added buffer when a table is created.
pub const BASELINE_CAPACITY: usize = 1024;
