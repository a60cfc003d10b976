/// Stable handle to a piece. Stays valid after the piece is split or joined;
/// resolve it through [`PieceArena::resolve`](crate::piece_table::arena::PieceArena::resolve).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) usize);

/// One neighbor an overwrite edit ate into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Consumption {
    pub piece: PieceId,
    /// The neighbor's `modified` before this edit touched it.
    pub pre_edit_modified: u64,
    /// Bytes this edit trimmed off the neighbor's front.
    pub consumed: u64,
    /// The neighbor was trimmed to nothing and left the piece list.
    pub fully_consumed: bool,
    /// Part of `consumed` that the last undo restored by widening the
    /// neighbor's window instead of lowering its trim. Redo narrows the
    /// window back by exactly this much before trimming the rest.
    pub widened: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Piece {
    /// A window into the original bytes.
    Original {
        offset: u64,
        length: u64,
        modified: u64,
    },
    /// A window into the added buffer, written by a committed edit.
    Added {
        offset: u64,
        length: u64,
        modified: u64,
        kind: crate::enums::EditKind,
        edit_seq: u64,
    },
    /// The staging piece of the edit being typed. `offset` is the document
    /// position the edit started at.
    InProgress {
        offset: u64,
        kind: crate::enums::EditKind,
        edit_seq: u64,
        content: Vec<u8>,
        consumption: Vec<Consumption>,
    },
}

/// Original pieces never came from an edit.
pub const ORIGINAL_EDIT_SEQ: u64 = 0;

impl Piece {
    /// Effective length: the bytes this piece contributes to the document.
    #[inline]
    pub fn len(&self) -> u64 {
        match self {
            Piece::Original {
                length, modified, ..
            }
            | Piece::Added {
                length, modified, ..
            } => length - modified,
            Piece::InProgress { content, .. } => content.len() as u64,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes trimmed off the front by overwrites.
    #[inline]
    pub fn modified(&self) -> u64 {
        match self {
            Piece::Original { modified, .. } | Piece::Added { modified, .. } => *modified,
            Piece::InProgress { .. } => 0,
        }
    }

    /// Start of the effective window inside the backing buffer.
    #[inline]
    pub fn effective_offset(&self) -> u64 {
        match self {
            Piece::Original {
                offset, modified, ..
            }
            | Piece::Added {
                offset, modified, ..
            } => offset + modified,
            Piece::InProgress { .. } => 0,
        }
    }

    #[inline]
    pub fn edit_seq(&self) -> u64 {
        match self {
            Piece::Original { .. } => ORIGINAL_EDIT_SEQ,
            Piece::Added { edit_seq, .. } | Piece::InProgress { edit_seq, .. } => *edit_seq,
        }
    }

    /// Whether the bytes came from an edit rather than the original.
    #[inline]
    pub fn is_edited(&self) -> bool {
        !matches!(self, Piece::Original { .. })
    }

    /// Trims `amount` bytes off the effective front.
    ///
    /// # Panics
    ///
    /// On a staging piece, or when `amount` exceeds the effective length.
    pub fn shrink_front(&mut self, amount: u64) {
        let available = self.len();

        match self {
            Piece::Original { modified, .. } | Piece::Added { modified, .. } => {
                assert!(amount <= available, "shrinking past the end of a piece");
                *modified += amount;
            }
            Piece::InProgress { .. } => unreachable!("staging pieces are never consumed"),
        }
    }

    /// Moves the effective front back by `amount` bytes. Undoes the trim
    /// first; a piece produced by a later split has no trim to undo, so its
    /// window itself is widened. Returns how many bytes were widened.
    pub fn extend_front(&mut self, amount: u64) -> u64 {
        match self {
            Piece::Original {
                offset,
                length,
                modified,
            }
            | Piece::Added {
                offset,
                length,
                modified,
                ..
            } => {
                let untrim = amount.min(*modified);
                let widen = amount - untrim;

                *modified -= untrim;
                debug_assert!(*offset >= widen, "widening before the backing buffer");
                *offset -= widen;
                *length += widen;

                widen
            }
            Piece::InProgress { .. } => unreachable!("staging pieces are never consumed"),
        }
    }

    /// Inverse of the widening half of [`Piece::extend_front`]: moves the
    /// window start forward by `amount` and leaves the trim alone.
    ///
    /// # Panics
    ///
    /// On a staging piece, or when `amount` exceeds the effective length.
    pub fn narrow_front(&mut self, amount: u64) {
        let available = self.len();

        match self {
            Piece::Original { offset, length, .. } | Piece::Added { offset, length, .. } => {
                assert!(amount <= available, "narrowing past the end of a piece");
                *offset += amount;
                *length -= amount;
            }
            Piece::InProgress { .. } => unreachable!("staging pieces are never consumed"),
        }
    }

    /// Splits the effective window at `local`, returning `[0, local)` and
    /// `[local, len)`. Both halves keep the type-specific fields.
    ///
    /// Returns `None` for a staging piece, or when either half would be empty.
    pub fn split(&self, local: u64) -> Option<(Piece, Piece)> {
        if local == 0 || local >= self.len() {
            return None;
        }

        let start = self.effective_offset();
        let rest = self.len() - local;

        match self {
            Piece::Original { .. } => Some((
                Piece::Original {
                    offset: start,
                    length: local,
                    modified: 0,
                },
                Piece::Original {
                    offset: start + local,
                    length: rest,
                    modified: 0,
                },
            )),
            Piece::Added { kind, edit_seq, .. } => Some((
                Piece::Added {
                    offset: start,
                    length: local,
                    modified: 0,
                    kind: *kind,
                    edit_seq: *edit_seq,
                },
                Piece::Added {
                    offset: start + local,
                    length: rest,
                    modified: 0,
                    kind: *kind,
                    edit_seq: *edit_seq,
                },
            )),
            Piece::InProgress { .. } => None,
        }
    }

    /// Same variant, same edit, and `next` starts exactly where `self` ends.
    pub fn is_continued_by(&self, next: &Piece) -> bool {
        let same_variant = matches!(
            (self, next),
            (Piece::Original { .. }, Piece::Original { .. })
                | (Piece::Added { .. }, Piece::Added { .. })
        );

        same_variant
            && self.edit_seq() == next.edit_seq()
            && self.effective_offset() + self.len() == next.effective_offset()
    }

    /// The single piece covering `self` followed by `next`. The front trim of
    /// `self` is kept so that whoever trimmed it can still undo the trim.
    ///
    /// Returns `None` unless `self.is_continued_by(next)`.
    pub fn joined(&self, next: &Piece) -> Option<Piece> {
        if !self.is_continued_by(next) {
            return None;
        }

        let mut joined = self.clone();

        match &mut joined {
            Piece::Original { length, .. } | Piece::Added { length, .. } => {
                *length += next.len();
            }
            Piece::InProgress { .. } => return None,
        }

        Some(joined)
    }
}
