/// Everything needed to take one committed edit out of the piece list and
/// put it back.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRecord {
    /// Identity of the committed piece. Later splits forward it.
    pub piece: crate::piece_table::piece::PieceId,
    pub kind: crate::enums::EditKind,
    pub edit_seq: u64,
    /// Document offset the edit was started at.
    pub offset: u64,
    /// Where the edit's bytes start in the added buffer.
    pub added_offset: u64,
    /// Number of bytes the edit appended to the added buffer.
    pub len: u64,
    /// Neighbors an overwrite trimmed, in the order it reached them.
    pub consumption: Vec<crate::piece_table::piece::Consumption>,
}

impl EditRecord {
    /// Bytes the edit removed from the document by overwriting them.
    pub fn consumed(&self) -> u64 {
        self.consumption.iter().map(|c| c.consumed).sum()
    }
}

/// Linear undo history. A new edit discards whatever could be redone.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<EditRecord>,
    redo_stack: Vec<EditRecord>,
}

impl History {
    pub fn record(&mut self, record: EditRecord) {
        debug_assert!(
            self.redo_stack.is_empty(),
            "redo branch must be rolled back before a new edit"
        );

        self.undo_stack.push(record);
    }

    pub fn take_for_undo(&mut self) -> Option<EditRecord> {
        self.undo_stack.pop()
    }

    pub fn push_redo(&mut self, record: EditRecord) {
        self.redo_stack.push(record);
    }

    pub fn take_for_redo(&mut self) -> Option<EditRecord> {
        self.redo_stack.pop()
    }

    pub fn push_undo(&mut self, record: EditRecord) {
        self.undo_stack.push(record);
    }

    /// Empties the redo stack, most recently undone first.
    pub fn discard_redo(&mut self) -> Vec<EditRecord> {
        let mut discarded = std::mem::take(&mut self.redo_stack);

        discarded.reverse();

        discarded
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[inline]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[inline]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::EditKind;
    use crate::piece_table::piece::{Consumption, PieceId};

    fn record(seq: u64) -> EditRecord {
        EditRecord {
            piece: PieceId(seq as usize),
            kind: EditKind::Insert,
            edit_seq: seq,
            offset: 0,
            added_offset: seq - 1,
            len: 1,
            consumption: Vec::new(),
        }
    }

    #[test]
    fn test_undo_redo_stack_movement() {
        let mut history = History::default();

        history.record(record(1));

        let undone = history.take_for_undo().unwrap();
        assert_eq!(history.undo_depth(), 0);
        history.push_redo(undone.clone());
        assert!(history.can_redo());

        let redone = history.take_for_redo().unwrap();
        assert_eq!(undone, redone);
        history.push_undo(redone);
        assert_eq!(history.undo_depth(), 1);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_discard_redo_returns_most_recent_first() {
        let mut history = History::default();

        history.push_redo(record(3));
        history.push_redo(record(2));

        let discarded = history.discard_redo();

        assert_eq!(
            discarded.iter().map(|r| r.edit_seq).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert!(!history.can_redo());
    }

    #[test]
    fn test_consumed_sums_all_neighbors() {
        let mut rec = record(1);

        rec.kind = EditKind::Overwrite;
        rec.consumption = vec![
            Consumption {
                piece: PieceId(0),
                pre_edit_modified: 0,
                consumed: 2,
                fully_consumed: true,
                widened: 0,
            },
            Consumption {
                piece: PieceId(1),
                pre_edit_modified: 3,
                consumed: 1,
                fully_consumed: false,
                widened: 0,
            },
        ];

        assert_eq!(rec.consumed(), 3);
    }
}
