use editor_core::controller::EditController;
use editor_core::enums::EditKind;
use editor_core::errors::EditResult;

/// What a typed key means.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditingMode {
    /// Printable ASCII characters, one byte per key.
    Ascii,
    /// Hex digits, two keys per byte.
    #[default]
    Byte,
    /// `0`/`1`, eight keys per byte, most significant bit first.
    Bit,
}

impl EditingMode {
    /// Keys needed to complete one byte.
    #[inline]
    pub fn keys_per_byte(self) -> u8 {
        match self {
            EditingMode::Ascii => 1,
            EditingMode::Byte => 2,
            EditingMode::Bit => 8,
        }
    }

    /// The digit `key` stands for in this mode, or the byte itself in ASCII
    /// mode.
    fn digit(self, key: char) -> Option<u8> {
        match self {
            EditingMode::Ascii => (key.is_ascii_graphic() || key == ' ').then_some(key as u8),
            EditingMode::Byte => key.to_digit(16).map(|d| d as u8),
            EditingMode::Bit => key.to_digit(2).map(|d| d as u8),
        }
    }
}

/// Keys typed toward a byte that is not complete yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Pending {
    value: u8,
    keys: u8,
}

/// A cursor and an editing mode in front of an [`EditController`], turning
/// keystrokes into edit sessions.
///
/// Typing starts an edit at the cursor when none is running and keeps
/// appending to it until the cursor is moved, the mode changes, or history
/// is walked.
#[derive(Debug)]
pub struct Document {
    pub controller: EditController,
    pub cursor: u64,
    mode: EditingMode,
    insert: bool,
    pending: Pending,
}

impl Document {
    pub fn new(controller: EditController) -> Self {
        Self {
            controller,
            cursor: 0,
            mode: EditingMode::default(),
            insert: false,
            pending: Pending::default(),
        }
    }

    #[inline]
    pub fn mode(&self) -> EditingMode {
        self.mode
    }

    /// Whether new edits insert rather than overwrite.
    #[inline]
    pub fn is_inserting(&self) -> bool {
        self.insert
    }

    /// Keys typed toward the next byte, as `(value so far, keys typed)`.
    #[inline]
    pub fn pending(&self) -> (u8, u8) {
        (self.pending.value, self.pending.keys)
    }
}

/*

====================================
============= TYPING ===============
====================================

*/

impl Document {
    /// Feeds one key. Keys that mean nothing in the current mode are
    /// ignored and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Whatever the controller reports while starting or extending the edit.
    pub fn type_key(&mut self, key: char) -> EditResult<bool> {
        let Some(digit) = self.mode.digit(key) else {
            return Ok(false);
        };

        if !self.controller.is_editing() {
            let kind = if self.insert {
                EditKind::Insert
            } else {
                EditKind::Overwrite
            };

            self.controller.init_edit(self.cursor, kind)?;
        }

        let shift = 8 / self.mode.keys_per_byte();

        // shifting a u8 by 8 would overflow, ASCII takes the digit whole
        self.pending.value = match self.mode {
            EditingMode::Ascii => digit,
            _ => (self.pending.value << shift) | digit,
        };
        self.pending.keys += 1;

        if self.pending.keys == self.mode.keys_per_byte() {
            let byte = self.pending.value;

            self.pending = Pending::default();
            self.controller.append_byte(byte)?;
            self.cursor += 1;
        }

        Ok(true)
    }

    /// Undoes the last key: a half-typed byte is cleared first, otherwise
    /// the last staged byte is removed. Does nothing while idle.
    ///
    /// # Errors
    ///
    /// Whatever the controller reports while removing the byte.
    pub fn backspace(&mut self) -> EditResult<bool> {
        if self.pending.keys > 0 {
            self.pending = Pending::default();

            return Ok(true);
        }

        if !self.controller.is_editing() {
            return Ok(false);
        }

        let removed = self.controller.backspace()?.is_some();

        if removed {
            self.cursor -= 1;
        }

        Ok(removed)
    }

    /// Finishes the edit in progress. A half-typed byte is dropped.
    ///
    /// # Errors
    ///
    /// Whatever the controller reports while committing.
    pub fn commit(&mut self) -> EditResult<()> {
        self.pending = Pending::default();

        if self.controller.is_editing() {
            self.controller.commit()?;
        }

        Ok(())
    }
}

/*

====================================
======== CURSOR AND MODES ==========
====================================

*/

impl Document {
    /// Commits, then places the cursor at `offset`, clamped to the document.
    ///
    /// # Errors
    ///
    /// See [`Document::commit`].
    pub fn move_cursor(&mut self, offset: u64) -> EditResult<()> {
        self.commit()?;
        self.cursor = offset.min(self.controller.len());

        Ok(())
    }

    /// Commits, then moves the cursor by `delta` bytes, stopping at either
    /// end.
    ///
    /// # Errors
    ///
    /// See [`Document::commit`].
    pub fn move_by(&mut self, delta: i64) -> EditResult<()> {
        self.move_cursor(self.cursor.saturating_add_signed(delta))
    }

    /// # Errors
    ///
    /// See [`Document::commit`].
    pub fn set_mode(&mut self, mode: EditingMode) -> EditResult<()> {
        if mode != self.mode {
            self.commit()?;
            self.mode = mode;
        }

        Ok(())
    }

    /// Flips between insert and overwrite for the next edit.
    ///
    /// # Errors
    ///
    /// See [`Document::commit`].
    pub fn toggle_insert(&mut self) -> EditResult<bool> {
        self.commit()?;
        self.insert = !self.insert;

        Ok(self.insert)
    }

    /// # Errors
    ///
    /// Whatever the controller reports while undoing.
    pub fn undo(&mut self) -> EditResult<bool> {
        self.pending = Pending::default();

        let undone = self.controller.undo()?;

        self.cursor = self.cursor.min(self.controller.len());

        Ok(undone)
    }

    /// # Errors
    ///
    /// Whatever the controller reports while redoing.
    pub fn redo(&mut self) -> EditResult<bool> {
        self.commit()?;

        let redone = self.controller.redo()?;

        self.cursor = self.cursor.min(self.controller.len());

        Ok(redone)
    }
}

#[cfg(test)]
mod document_tests {
    use super::*;

    fn doc(bytes: &[u8]) -> Document {
        Document::new(EditController::new(bytes).unwrap())
    }

    fn type_str(doc: &mut Document, keys: &str) {
        for key in keys.chars() {
            doc.type_key(key).unwrap();
        }
    }

    fn bytes(doc: &Document) -> Vec<u8> {
        doc.controller.save().unwrap()
    }

    #[test]
    fn hex_nibbles_pair_into_bytes() {
        let mut doc = doc(&[0, 0, 0]);

        type_str(&mut doc, "a");
        assert_eq!(bytes(&doc), [0, 0, 0], "half a byte is held back");
        assert_eq!(doc.pending(), (0xa, 1));
        assert_eq!(doc.cursor, 0);

        type_str(&mut doc, "BfF");
        assert_eq!(bytes(&doc), [0xab, 0xff, 0]);
        assert_eq!(doc.cursor, 2);
    }

    #[test]
    fn keys_outside_the_mode_are_ignored() {
        let mut doc = doc(&[1, 2]);

        assert!(!doc.type_key('g').unwrap());
        assert!(!doc.controller.is_editing());

        doc.set_mode(EditingMode::Bit).unwrap();
        assert!(!doc.type_key('2').unwrap());

        doc.set_mode(EditingMode::Ascii).unwrap();
        assert!(!doc.type_key('\n').unwrap());
        assert!(!doc.type_key('é').unwrap());
        assert_eq!(bytes(&doc), [1, 2]);
    }

    #[test]
    fn bits_pack_most_significant_first() {
        let mut doc = doc(&[0xff]);

        doc.set_mode(EditingMode::Bit).unwrap();
        type_str(&mut doc, "0100000");
        assert_eq!(bytes(&doc), [0xff]);

        type_str(&mut doc, "1");
        assert_eq!(bytes(&doc), [0x41]);
    }

    #[test]
    fn ascii_mode_types_characters() {
        let mut doc = doc(b"....");

        doc.set_mode(EditingMode::Ascii).unwrap();
        doc.move_cursor(1).unwrap();
        type_str(&mut doc, "hi ");

        assert_eq!(bytes(&doc), b".hi ");
        assert_eq!(doc.cursor, 4);
    }

    #[test]
    fn insert_toggle_shifts_instead_of_overwriting() {
        let mut doc = doc(&[0x11, 0x22]);

        assert!(doc.toggle_insert().unwrap());
        doc.move_cursor(1).unwrap();
        type_str(&mut doc, "ee");

        assert_eq!(bytes(&doc), [0x11, 0xee, 0x22]);
    }

    #[test]
    fn overwrite_at_end_grows_the_document() {
        let mut doc = doc(&[0x11]);

        doc.move_cursor(1).unwrap();
        type_str(&mut doc, "2233");

        assert_eq!(bytes(&doc), [0x11, 0x22, 0x33]);
        assert_eq!(doc.cursor, 3);
    }

    #[test]
    fn backspace_clears_half_typed_byte_first() {
        let mut doc = doc(&[0, 0]);

        type_str(&mut doc, "12f");
        assert!(doc.backspace().unwrap());
        assert_eq!(doc.pending(), (0, 0));
        assert_eq!(bytes(&doc), [0x12, 0]);

        assert!(doc.backspace().unwrap());
        assert_eq!(bytes(&doc), [0, 0]);
        assert_eq!(doc.cursor, 0);

        assert!(!doc.backspace().unwrap());
    }

    #[test]
    fn moving_commits_one_undo_step() {
        let mut doc = doc(&[0, 0, 0, 0]);

        type_str(&mut doc, "0102");
        doc.move_cursor(3).unwrap();
        type_str(&mut doc, "ff");
        doc.move_by(-10).unwrap();

        assert_eq!(doc.cursor, 0);
        assert_eq!(bytes(&doc), [1, 2, 0, 0xff]);

        assert!(doc.undo().unwrap());
        assert_eq!(bytes(&doc), [1, 2, 0, 0]);

        assert!(doc.undo().unwrap());
        assert_eq!(bytes(&doc), [0, 0, 0, 0]);

        assert!(doc.redo().unwrap());
        assert_eq!(bytes(&doc), [1, 2, 0, 0]);
    }

    #[test]
    fn undo_clamps_the_cursor() {
        let mut doc = doc(&[]);

        type_str(&mut doc, "aabbcc");
        assert_eq!(doc.cursor, 3);

        doc.undo().unwrap();
        assert_eq!(doc.cursor, 0);
        assert!(doc.controller.is_empty());
    }

    #[test]
    fn undo_mid_edit_takes_the_whole_edit() {
        let mut doc = doc(&[9, 9]);

        type_str(&mut doc, "01f");
        assert!(doc.undo().unwrap());

        assert_eq!(bytes(&doc), [9, 9]);
        assert_eq!(doc.pending(), (0, 0));
    }
}
