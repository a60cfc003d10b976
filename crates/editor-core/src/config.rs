/// Tunables for an [`EditController`](crate::controller::EditController).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// Bytes reserved up front for the added buffer.
    pub added_capacity: usize,
    /// A search stops after this many matches and returns what it found.
    pub search_match_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            added_capacity: crate::piece_table::BASELINE_CAPACITY,
            search_match_limit: DEFAULT_SEARCH_MATCH_LIMIT,
        }
    }
}

pub const DEFAULT_SEARCH_MATCH_LIMIT: usize = 100_000;
