use std::io::Write;

/// Atomically replaces `path` with the concatenation of `chunks`.
///
/// The bytes are written to a temporary file in the destination's own
/// directory, flushed, and renamed over the target, so a crash mid-write
/// leaves the previous file intact. A rename across filesystems would not be
/// atomic, hence the sibling temp file.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written, or if
/// the final rename fails.
pub fn write_atomic<'a, I>(path: impl AsRef<std::path::Path>, chunks: I) -> std::io::Result<u64>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let path = path.as_ref();
    let parent_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => std::path::Path::new("."),
    };
    let mut temp = tempfile::Builder::new()
        .prefix(".save_tmp_")
        .tempfile_in(parent_dir)?;
    let mut written = 0u64;

    for chunk in chunks {
        temp.write_all(chunk)?;
        written += <usize as TryInto<u64>>::try_into(chunk.len())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(written)
}
