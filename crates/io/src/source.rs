/// The immutable original bytes of a document.
///
/// Small inputs and tests live in memory; files opened from disk stay mapped
/// so that opening a large binary does not copy it.
#[derive(Debug)]
pub enum ByteSource {
    Memory(Box<[u8]>),
    Mapped(crate::mmap::MmapFile),
}

impl ByteSource {
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            ByteSource::Memory(bytes) => bytes,
            ByteSource::Mapped(mmap) => mmap.as_slice(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// STRICT: exactly `start..start + length`, or `None` when the window
    /// leaves the source or the end overflows.
    #[inline]
    #[must_use]
    pub fn get_bytes_exact(&self, start: usize, length: usize) -> Option<&[u8]> {
        let end = start.checked_add(length)?;

        self.as_slice().get(start..end)
    }
}

impl Default for ByteSource {
    fn default() -> Self {
        ByteSource::Memory(Box::default())
    }
}

impl From<Vec<u8>> for ByteSource {
    fn from(value: Vec<u8>) -> Self {
        ByteSource::Memory(value.into_boxed_slice())
    }
}

impl From<&[u8]> for ByteSource {
    fn from(value: &[u8]) -> Self {
        ByteSource::Memory(value.into())
    }
}

impl<const N: usize> From<[u8; N]> for ByteSource {
    fn from(value: [u8; N]) -> Self {
        ByteSource::Memory(Box::new(value))
    }
}

impl From<crate::mmap::MmapFile> for ByteSource {
    fn from(value: crate::mmap::MmapFile) -> Self {
        ByteSource::Mapped(value)
    }
}

#[cfg(test)]
mod source_tests {
    use crate::source::ByteSource;

    #[test]
    fn exact_rejects_out_of_range() {
        let source = ByteSource::from(vec![1, 2, 3]);

        assert_eq!(source.get_bytes_exact(1, 2), Some(&[2, 3][..]));
        assert_eq!(source.get_bytes_exact(2, 2), None);
        assert_eq!(source.get_bytes_exact(usize::MAX, 2), None);
    }

    #[test]
    fn mapped_and_memory_agree() {
        use std::io::Write;

        let mut temp = tempfile::NamedTempFile::new().unwrap();

        temp.write_all(b"ABCD").unwrap();
        temp.as_file().sync_all().unwrap();

        let mapped = ByteSource::from(crate::mmap::MmapFile::open(temp.path()).unwrap());
        let memory = ByteSource::from(&b"ABCD"[..]);

        assert_eq!(mapped.as_slice(), memory.as_slice());
        assert!(!mapped.is_empty());
        assert!(ByteSource::default().is_empty());
    }
}
