use std::ops::{AddAssign, SubAssign};

use crate::piece_table::piece::{Piece, PieceId};

#[derive(Debug)]
pub struct PieceTable {
    /// Original bytes the document was opened with; never written.
    pub original: io::source::ByteSource,
    /// Append-only buffer holding the bytes of every committed edit.
    pub added: Vec<u8>,
    /// Every piece ever created, live or forwarded.
    pub arena: crate::piece_table::arena::PieceArena,
    /// Ordered live pieces describing the visible document.
    pieces: Vec<PieceId>,
}

/// Where a document offset falls in the piece list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Located {
    pub index: usize,
    pub id: PieceId,
    /// Offset inside the piece's effective window.
    pub local: u64,
}

/// Bytes of a document range, plus which of them came from edits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    /// Maximal runs of edited bytes, relative to the start of the range.
    pub added: Vec<std::ops::Range<u64>>,
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl PieceTable {
    pub fn new(
        original: io::source::ByteSource,
        added_capacity: usize,
    ) -> Result<Self, crate::enums::MathError> {
        let mut arena = crate::piece_table::arena::PieceArena::default();
        let mut pieces = Vec::new();

        if !original.is_empty() {
            pieces.push(arena.alloc(Piece::Original {
                offset: 0,
                length: crate::enums::to_u64(original.len())?,
                modified: 0,
            }));
        }

        Ok(Self {
            original,
            added: Vec::with_capacity(added_capacity),
            arena,
            pieces,
        })
    }
}

/*

====================================
========= INLINE METHODS  ==========
====================================

*/

impl PieceTable {
    /// Total document length in bytes, summed over the piece list.
    #[inline]
    pub fn len(&self) -> u64 {
        self.pieces().map(Piece::len).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn ids(&self) -> &[PieceId] {
        &self.pieces
    }

    #[inline]
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().map(|id| self.live(*id))
    }

    /// A piece that is in the list.
    ///
    /// # Panics
    ///
    /// If `id` was forwarded or retired; the list only ever holds live pieces.
    #[inline]
    pub fn live(&self, id: PieceId) -> &Piece {
        self.arena
            .get(id)
            .expect("piece list only holds live pieces")
    }

    #[inline]
    pub fn live_mut(&mut self, id: PieceId) -> &mut Piece {
        self.arena
            .get_mut(id)
            .expect("piece list only holds live pieces")
    }

    /// Finds the piece whose running end first reaches `offset`. An offset
    /// on a boundary therefore lands at the end of the piece before it.
    pub fn locate(&self, offset: u64) -> Option<Located> {
        let mut start = 0u64;

        for (index, id) in self.pieces.iter().enumerate() {
            let len = self.live(*id).len();

            if start + len >= offset {
                return Some(Located {
                    index,
                    id: *id,
                    local: offset - start,
                });
            }

            start.add_assign(len);
        }

        None
    }

    #[inline]
    pub fn position_of(&self, id: PieceId) -> Option<usize> {
        self.pieces.iter().position(|candidate| *candidate == id)
    }
}

/*

=====================================
========= SLICING / RENDER ==========
=====================================

*/

impl PieceTable {
    /// The effective bytes of a piece.
    pub fn slice_of<'a>(&'a self, piece: &'a Piece) -> Result<&'a [u8], crate::enums::MathError> {
        match piece {
            Piece::Original { .. } => {
                let start = crate::enums::to_usize(piece.effective_offset())?;
                let len = crate::enums::to_usize(piece.len())?;

                self.original
                    .get_bytes_exact(start, len)
                    .ok_or(crate::enums::MathError::OutOfBounds(self.original.len()))
            }
            Piece::Added { .. } => {
                let start = crate::enums::to_usize(piece.effective_offset())?;
                let end = start
                    .checked_add(crate::enums::to_usize(piece.len())?)
                    .ok_or(crate::enums::MathError::Overflow)?;

                self.added
                    .get(start..end)
                    .ok_or(crate::enums::MathError::OutOfBounds(self.added.len()))
            }
            Piece::InProgress { content, .. } => Ok(content),
        }
    }

    /// Copies up to `length` bytes starting at `start`. Fewer bytes come back
    /// when the document ends first; that is not an error.
    pub fn render(&self, start: u64, length: u64) -> Result<Rendered, crate::enums::MathError> {
        let mut rendered = Rendered::default();

        let Some(found) = self.locate(start) else {
            return Ok(rendered);
        };

        let available = self.len().saturating_sub(start).min(length);

        rendered.bytes.reserve(crate::enums::to_usize(available)?);

        let mut remaining = length;
        let mut local = found.local;

        for id in &self.pieces[found.index..] {
            if remaining == 0 {
                break;
            }

            let piece = self.live(*id);
            let take = (piece.len() - local).min(remaining);

            if take > 0 {
                let bytes = self.slice_of(piece)?;
                let from = crate::enums::to_usize(local)?;
                let to = crate::enums::to_usize(local + take)?;
                let out_start = crate::enums::to_u64(rendered.bytes.len())?;

                rendered.bytes.extend_from_slice(&bytes[from..to]);

                if piece.is_edited() {
                    match rendered.added.last_mut() {
                        Some(last) if last.end == out_start => last.end = out_start + take,
                        _ => rendered.added.push(out_start..out_start + take),
                    }
                }

                remaining.sub_assign(take);
            }

            local = 0;
        }

        Ok(rendered)
    }

    /// Yields the document as a sequence of borrowed slices, one per piece.
    pub fn iter_bytes(&self) -> impl Iterator<Item = Result<&[u8], crate::enums::MathError>> + '_ {
        self.pieces().map(move |piece| self.slice_of(piece))
    }
}

/*

====================================
========= SPLIT / JOIN =============
====================================

*/

impl PieceTable {
    /// Splits the piece at `index` at `local`. The old identity forwards to
    /// the two halves. Nothing happens when either half would be empty.
    pub fn split_at(&mut self, index: usize, local: u64) -> bool {
        let id = self.pieces[index];
        let Some((left, right)) = self.live(id).split(local) else {
            return false;
        };

        let left = self.arena.alloc(left);
        let right = self.arena.alloc(right);

        self.arena.forward(id, vec![left, right]);
        self.pieces.splice(index..=index, [left, right]);

        log::trace!("split {id:?} at {local} into {left:?} + {right:?}");

        true
    }

    /// List index at which something placed at document `offset` belongs,
    /// splitting the covering piece if `offset` falls inside it.
    ///
    /// Returns `None` when `offset` is past the end of the document.
    pub fn split_point(&mut self, offset: u64) -> Option<usize> {
        if offset == 0 {
            return Some(0);
        }

        let found = self.locate(offset)?;

        debug_assert!(
            !matches!(self.live(found.id), Piece::InProgress { .. })
                || found.local == self.live(found.id).len(),
            "staging pieces are never split"
        );

        self.split_at(found.index, found.local);

        Some(found.index + 1)
    }

    /// Joins the pieces at `index` and `index + 1` when the second continues
    /// the first. Both old identities forward to the joined piece.
    pub fn join_at(&mut self, index: usize) -> Option<PieceId> {
        let first = *self.pieces.get(index)?;
        let second = *self.pieces.get(index + 1)?;
        let joined = self.live(first).joined(self.live(second))?;
        let joined = self.arena.alloc(joined);

        self.arena.forward(first, vec![joined]);
        self.arena.forward(second, vec![joined]);
        self.pieces.splice(index..=index + 1, [joined]);

        log::trace!("joined {first:?} + {second:?} into {joined:?}");

        Some(joined)
    }

    /// Left-to-right pass joining every maximal run of continuing pieces.
    /// Returns the number of joins made.
    pub fn coalesce(&mut self) -> usize {
        let mut joins = 0;
        let mut index = 0;

        while index + 1 < self.pieces.len() {
            if self.join_at(index).is_some() {
                joins.add_assign(1);
            } else {
                index.add_assign(1);
            }
        }

        joins
    }

    /// Drops every arena slot the piece list does not use. Ids held outside
    /// the list are invalidated. Returns the number of slots freed.
    pub fn compact(&mut self) -> usize {
        let before = self.arena.capacity_used();

        if before == self.pieces.len() {
            return 0;
        }

        self.pieces = self.arena.compact(&self.pieces);

        before - self.arena.capacity_used()
    }
}

/*

=====================================
========= LIST MUTATION =============
=====================================

*/

impl PieceTable {
    pub fn insert_piece(&mut self, index: usize, piece: Piece) -> PieceId {
        let id = self.arena.alloc(piece);

        self.pieces.insert(index, id);

        id
    }

    /// Puts existing live pieces back into the list at `index`.
    pub fn insert_ids(&mut self, index: usize, ids: &[PieceId]) {
        debug_assert!(ids.iter().all(|id| self.arena.is_live(*id)));

        self.pieces.splice(index..index, ids.iter().copied());
    }

    pub fn remove_at(&mut self, index: usize) -> PieceId {
        self.pieces.remove(index)
    }

    pub fn remove_range(&mut self, range: std::ops::Range<usize>) -> Vec<PieceId> {
        self.pieces.drain(range).collect()
    }

    /// Drops the tail of the added buffer. Only bytes no live piece points
    /// into may go.
    pub fn truncate_added(&mut self, len: usize) {
        debug_assert!(
            self.pieces().all(|piece| match piece {
                Piece::Added { offset, length, .. } => (offset + length) as usize <= len,
                _ => true,
            }),
            "truncating bytes a live piece still references"
        );

        self.added.truncate(len);
    }
}

/*

====================================
=========== DIAGNOSTICS ============
====================================

*/

impl PieceTable {
    /// Checks the piece list invariants: every piece live and listed once,
    /// no empty committed piece, every window inside its buffer, at most one
    /// staging piece.
    ///
    /// # Errors
    ///
    /// Describes the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let mut staging = 0usize;
        let mut seen = std::collections::HashSet::with_capacity(self.pieces.len());

        for (index, id) in self.pieces.iter().enumerate() {
            let Some(piece) = self.arena.get(*id) else {
                return Err(format!("{id:?} at {index} is not live"));
            };

            if !seen.insert(*id) {
                return Err(format!("{id:?} is listed twice"));
            }

            match piece {
                Piece::Original {
                    offset,
                    length,
                    modified,
                } => {
                    if modified > length {
                        return Err(format!("{id:?} trimmed past its length"));
                    }

                    if offset + length > self.original.len() as u64 {
                        return Err(format!("{id:?} reaches past the original"));
                    }
                }
                Piece::Added {
                    offset,
                    length,
                    modified,
                    ..
                } => {
                    if modified > length {
                        return Err(format!("{id:?} trimmed past its length"));
                    }

                    if offset + length > self.added.len() as u64 {
                        return Err(format!("{id:?} reaches past the added buffer"));
                    }
                }
                Piece::InProgress { .. } => staging.add_assign(1),
            }

            if piece.is_empty() && !matches!(piece, Piece::InProgress { .. }) {
                return Err(format!("{id:?} at {index} is empty"));
            }
        }

        if staging > 1 {
            return Err(format!("{staging} staging pieces in the list"));
        }

        Ok(())
    }
}
