//! The edit buffer behind a hex editor: a piece table over immutable
//! original bytes, linear undo/redo, and byte-pattern search.
pub mod config;
pub mod controller;
pub mod enums;
pub mod errors;
pub mod history;
pub mod piece_table;
pub mod search;
