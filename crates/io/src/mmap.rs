/// A read-only memory map over a file on disk.
#[derive(Debug)]
pub struct MmapFile {
    _file: std::fs::File,
    mmap: memmap2::Mmap,
    path: std::path::PathBuf,
}

impl MmapFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = std::fs::File::open(&path)?;

        // SAFETY:
        // - The file is opened read-only and the handle lives as long as the map.
        // - Only shared `&[u8]` views are ever handed out.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };

        Ok(Self {
            _file: file,
            mmap,
            path,
        })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }

    /// Mapped length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(test)]
mod mmap_tests {
    use std::io::Write;

    #[test]
    fn maps_file_contents() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();

        temp.write_all(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
        temp.as_file().sync_all().unwrap();

        let mapped = crate::mmap::MmapFile::open(temp.path()).unwrap();

        assert_eq!(mapped.as_slice(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(mapped.len(), 4);
        assert_eq!(mapped.path(), temp.path());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = crate::mmap::MmapFile::open(dir.path().join("nope.bin")).unwrap_err();

        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
