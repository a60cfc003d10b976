/// # Search Module.
///
/// Byte-pattern search over a rendered window of the document, and the
/// parsers that turn typed search text into the bytes to look for.
pub mod pattern;

/// Matches found in one window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Matches {
    /// Start of every match, relative to the window.
    pub positions: Vec<usize>,
    /// The match limit was hit before the window was exhausted.
    pub truncated: bool,
}

/// Finds every non-overlapping occurrence of `pattern` in `window`, stopping
/// after `limit` matches.
///
/// Bad-character search: the window byte under the pattern's last byte picks
/// how far to slide, so absent bytes skip the whole pattern length.
pub fn find_all(window: &[u8], pattern: &[u8], limit: usize) -> Matches {
    let mut matches = Matches::default();
    let m = pattern.len();

    if m == 0 || window.len() < m || limit == 0 {
        return matches;
    }

    if m == 1 {
        for position in memchr::memchr_iter(pattern[0], window) {
            if matches.positions.len() == limit {
                matches.truncated = true;
                break;
            }

            matches.positions.push(position);
        }

        return matches;
    }

    let shift = shift_table(pattern);
    let last = pattern[m - 1];
    let mut at = 0usize;

    while at + m <= window.len() {
        let under_last = window[at + m - 1];

        if under_last == last && window[at..at + m - 1] == pattern[..m - 1] {
            if matches.positions.len() == limit {
                matches.truncated = true;
                break;
            }

            matches.positions.push(at);
            at += m;

            continue;
        }

        at += shift[usize::from(under_last)];
    }

    matches
}

/// Slide distance per byte: distance from its last occurrence (excluding the
/// final position) to the end of the pattern, or the full length if absent.
fn shift_table(pattern: &[u8]) -> [usize; 256] {
    let m = pattern.len();
    let mut shift = [m; 256];

    for (index, byte) in pattern[..m - 1].iter().enumerate() {
        shift[usize::from(*byte)] = m - 1 - index;
    }

    shift
}
