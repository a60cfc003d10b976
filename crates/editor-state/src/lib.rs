pub mod document;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Edit(#[from] editor_core::errors::EditError),
}

/// One open file.
///
/// - [`document::Document`] holds the cursor and turns keys into edits on its
///   [`editor_core::controller::EditController`].
/// - The controller reads the file through a read-only memory map, so
///   opening is O(1) in the file's size and saving streams the pieces
///   straight to disk.
#[derive(Debug)]
pub struct EditorState {
    pub path: std::path::PathBuf,
    pub document: document::Document,
}

impl EditorState {
    /// Opens a file via memory-mapped I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StateError> {
        Self::open_with_config(path, editor_core::config::EditorConfig::default())
    }

    /// # Errors
    ///
    /// See [`EditorState::open`].
    pub fn open_with_config(
        path: impl AsRef<std::path::Path>,
        config: editor_core::config::EditorConfig,
    ) -> Result<Self, StateError> {
        let path = path.as_ref().to_path_buf();
        let mmap = io::mmap::MmapFile::open(&path)?;
        let controller = editor_core::controller::EditController::with_config(mmap, config)?;

        log::info!("opened {} ({} bytes)", path.display(), controller.len());

        Ok(Self {
            path,
            document: document::Document::new(controller),
        })
    }

    /// Writes the document back to the file it was opened from.
    ///
    /// # Errors
    ///
    /// See [`EditorState::save_as`].
    pub fn save(&mut self) -> Result<u64, StateError> {
        let path = self.path.clone();

        self.save_as(path)
    }

    /// Commits any edit in progress, writes the document to `path`, and
    /// continues from the written file with empty history. Returns the number
    /// of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or mapped again. On a
    /// failed write the document and its history are untouched.
    pub fn save_as(&mut self, path: impl AsRef<std::path::Path>) -> Result<u64, StateError> {
        let path = path.as_ref().to_path_buf();

        self.document.commit()?;

        let written = io::save::write_atomic(&path, self.document.controller.chunks()?)?;
        let mmap = io::mmap::MmapFile::open(&path)?;

        self.document.controller.reset(mmap)?;
        self.document.cursor = self.document.cursor.min(self.document.controller.len());
        self.path = path;

        log::info!("saved {} ({written} bytes)", self.path.display());

        Ok(written)
    }
}

#[cfg(test)]
mod editor_state_tests {
    use std::io::Write;

    use super::*;

    fn file_with(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();

        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn open_reads_the_file() {
        let file = file_with(b"\x00\x01\x02");
        let state = EditorState::open(file.path()).unwrap();

        assert_eq!(state.document.controller.save().unwrap(), [0, 1, 2]);
        assert_eq!(state.path, file.path());
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            EditorState::open(dir.path().join("absent.bin")),
            Err(StateError::Io(_))
        ));
    }

    #[test]
    fn save_writes_edits_and_resets_history() {
        let file = file_with(&[0x10, 0x20, 0x30]);
        let mut state = EditorState::open(file.path()).unwrap();

        state.document.move_cursor(1).unwrap();
        for key in "ab".chars() {
            state.document.type_key(key).unwrap();
        }

        // still staging, save commits it
        assert_eq!(state.save().unwrap(), 3);
        assert_eq!(std::fs::read(file.path()).unwrap(), [0x10, 0xab, 0x30]);

        assert!(!state.document.controller.can_undo());
        assert!(state.document.controller.table().added.is_empty());
        assert_eq!(state.document.controller.save().unwrap(), [0x10, 0xab, 0x30]);
    }

    #[test]
    fn save_as_moves_to_the_new_path() {
        let file = file_with(b"abc");
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("copy.bin");
        let mut state = EditorState::open(file.path()).unwrap();

        state.document.toggle_insert().unwrap();
        state.document.set_mode(document::EditingMode::Ascii).unwrap();
        state.document.move_cursor(3).unwrap();
        state.document.type_key('!').unwrap();

        assert_eq!(state.save_as(&target).unwrap(), 4);
        assert_eq!(std::fs::read(&target).unwrap(), b"abc!");
        assert_eq!(std::fs::read(file.path()).unwrap(), b"abc");
        assert_eq!(state.path, target);
    }

    #[test]
    fn editing_continues_after_save() {
        let file = file_with(&[1, 2, 3, 4]);
        let mut state = EditorState::open(file.path()).unwrap();

        state.document.move_cursor(3).unwrap();
        for key in "ff".chars() {
            state.document.type_key(key).unwrap();
        }
        state.save().unwrap();

        state.document.move_cursor(0).unwrap();
        for key in "ee".chars() {
            state.document.type_key(key).unwrap();
        }
        state.save().unwrap();

        assert_eq!(std::fs::read(file.path()).unwrap(), [0xee, 2, 3, 0xff]);
    }
}
