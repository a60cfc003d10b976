use crate::enums::{ChangeEvent, EditKind};
use crate::errors::{EditError, EditResult, SearchError};
use crate::history::{EditRecord, History};
use crate::piece_table::piece::{Consumption, Piece, PieceId};
use crate::piece_table::table::{PieceTable, Rendered};

/// The staging piece and where it sits in the piece list. The list is only
/// touched by the session while staging, so the index stays put.
#[derive(Clone, Copy, Debug)]
struct Staging {
    id: PieceId,
    index: usize,
}

/// # The edit buffer.
///
/// - Reads never copy more than the requested range: the document is a piece
///   list over the original bytes and an append-only added buffer.
/// - Edits are typed one byte at a time into a staging piece
///   (`init_edit → append_byte* → commit`) and become one undo step each.
/// - History is linear. Starting a new edit while something could be redone
///   throws the redo branch away for good.
#[derive(Debug)]
pub struct EditController {
    table: PieceTable,
    history: History,
    staging: Option<Staging>,
    config: crate::config::EditorConfig,
    notifier: util::notify::Notifier<ChangeEvent>,
}

/*

====================================
========= CREATION METHOD ==========
====================================

*/

impl EditController {
    /// # Errors
    ///
    /// Only if the original's length does not fit the document's `u64`
    /// offsets.
    pub fn new(original: impl Into<io::source::ByteSource>) -> EditResult<Self> {
        Self::with_config(original, crate::config::EditorConfig::default())
    }

    /// # Errors
    ///
    /// See [`EditController::new`].
    pub fn with_config(
        original: impl Into<io::source::ByteSource>,
        config: crate::config::EditorConfig,
    ) -> EditResult<Self> {
        Ok(Self {
            table: PieceTable::new(original.into(), config.added_capacity)?,
            history: History::default(),
            staging: None,
            config,
            notifier: util::notify::Notifier::new(),
        })
    }

    /// Replaces the original bytes, typically with the file just saved, and
    /// forgets all history. Listeners stay registered.
    ///
    /// # Errors
    ///
    /// [`EditError::EditInProgress`] while an edit is staging.
    pub fn reset(&mut self, original: impl Into<io::source::ByteSource>) -> EditResult<()> {
        if self.staging.is_some() {
            return Err(EditError::EditInProgress);
        }

        self.table = PieceTable::new(original.into(), self.config.added_capacity)?;
        self.history.clear();

        Ok(())
    }
}

/*

====================================
============ QUERIES ===============
====================================

*/

impl EditController {
    /// Document length, summed over the piece list.
    #[inline]
    pub fn len(&self) -> u64 {
        self.table.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[inline]
    pub fn is_editing(&self) -> bool {
        self.staging.is_some()
    }

    /// Bytes typed into the edit in progress.
    pub fn staged(&self) -> Option<&[u8]> {
        let staging = self.staging?;

        match self.table.live(staging.id) {
            Piece::InProgress { content, .. } => Some(content),
            _ => None,
        }
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.staging.is_some()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[inline]
    pub fn config(&self) -> &crate::config::EditorConfig {
        &self.config
    }

    /// Up to `length` bytes from `start`, with the edited runs marked.
    ///
    /// # Errors
    ///
    /// Only on offset arithmetic overflow.
    pub fn render(&self, start: u64, length: u64) -> EditResult<Rendered> {
        Ok(self.table.render(start, length)?)
    }

    /// The whole document.
    ///
    /// # Errors
    ///
    /// See [`EditController::render`].
    pub fn save(&self) -> EditResult<Vec<u8>> {
        Ok(self.render(0, self.len())?.bytes)
    }

    /// The whole document as borrowed slices, one per piece, for streaming
    /// to a destination without assembling it first.
    ///
    /// # Errors
    ///
    /// See [`EditController::render`].
    pub fn chunks(&self) -> EditResult<Vec<&[u8]>> {
        Ok(self.table.iter_bytes().collect::<Result<Vec<_>, _>>()?)
    }

    /// Read-only view of the live piece list.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.table.pieces()
    }

    pub fn table(&self) -> &PieceTable {
        &self.table
    }
}

/*

====================================
========== OBSERVATION =============
====================================

*/

impl EditController {
    /// Runs `listener` after every commit, abort, undo, and redo.
    pub fn on_change(
        &mut self,
        listener: impl FnMut(&ChangeEvent) + 'static,
    ) -> util::notify::ListenerId {
        self.notifier.on_change(listener)
    }

    pub fn remove_listener(&mut self, id: util::notify::ListenerId) -> bool {
        self.notifier.remove(id)
    }

    /// A channel receiving every change event from now on.
    pub fn subscribe(&mut self) -> util::notify::Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }

    fn changed(&mut self, event: ChangeEvent) {
        debug_assert_eq!(self.table.check_invariants(), Ok(()));

        self.notifier.notify(&event);
    }
}

/*

=====================================
========= EDIT SESSION ==============
=====================================

*/

impl EditController {
    /// Starts an edit at `offset`. A pending redo branch is discarded first.
    ///
    /// # Errors
    ///
    /// - [`EditError::EditInProgress`] if an edit is already staging.
    /// - [`EditError::OutOfBounds`] if `offset` is past the end.
    pub fn init_edit(&mut self, offset: u64, kind: EditKind) -> EditResult<()> {
        if self.staging.is_some() {
            return Err(EditError::EditInProgress);
        }

        let len = self.len();

        if offset > len {
            return Err(EditError::OutOfBounds { offset, len });
        }

        if self.history.can_redo() {
            self.rollback()?;
        }

        let edit_seq = crate::enums::to_u64(self.history.undo_depth())? + 1;
        let index = self
            .table
            .split_point(offset)
            .ok_or(EditError::OutOfBounds { offset, len })?;

        // no record left that could name a retired piece
        if !self.history.can_undo() {
            let freed = self.table.compact();

            if freed > 0 {
                log::debug!("compacted the piece arena, {freed} slots freed");
            }
        }

        let id = self.table.insert_piece(
            index,
            Piece::InProgress {
                offset,
                kind,
                edit_seq,
                content: Vec::new(),
                consumption: Vec::new(),
            },
        );

        self.staging = Some(Staging { id, index });

        log::debug!("edit #{edit_seq} started at {offset} ({kind:?})");

        Ok(())
    }

    /// Adds one byte to the edit in progress. An overwrite eats one byte
    /// of what follows; at the end of the document it extends it instead.
    ///
    /// # Errors
    ///
    /// [`EditError::NoEditInProgress`] without a preceding `init_edit`.
    pub fn append_byte(&mut self, byte: u8) -> EditResult<()> {
        let staging = self.staging.ok_or(EditError::NoEditInProgress)?;

        let kind = match self.table.live_mut(staging.id) {
            Piece::InProgress { content, kind, .. } => {
                content.push(byte);
                *kind
            }
            _ => unreachable!("staging id always names the staging piece"),
        };

        if kind == EditKind::Overwrite {
            self.consume_one(staging);
        }

        Ok(())
    }

    /// Removes the last staged byte, giving back what it overwrote.
    ///
    /// Returns the removed byte, or `None` if nothing was staged.
    ///
    /// # Errors
    ///
    /// [`EditError::NoEditInProgress`] while idle.
    pub fn backspace(&mut self) -> EditResult<Option<u8>> {
        let staging = self.staging.ok_or(EditError::NoEditInProgress)?;

        let (popped, kind, remaining, consumed) = match self.table.live_mut(staging.id) {
            Piece::InProgress {
                content,
                kind,
                consumption,
                ..
            } => {
                let popped = content.pop();
                let consumed: u64 = consumption.iter().map(|c| c.consumed).sum();

                (popped, *kind, content.len(), consumed)
            }
            _ => unreachable!("staging id always names the staging piece"),
        };

        // bytes typed past the end of the document consumed nothing
        if popped.is_some()
            && kind == EditKind::Overwrite
            && consumed > crate::enums::to_u64(remaining)?
        {
            self.unconsume_one(staging);
        }

        Ok(popped)
    }

    /// Turns the staged bytes into a committed, undoable edit. With nothing
    /// staged the edit is discarded as by [`EditController::abort`].
    ///
    /// # Errors
    ///
    /// [`EditError::NoEditInProgress`] while idle.
    pub fn commit(&mut self) -> EditResult<()> {
        let staging = self.staging.ok_or(EditError::NoEditInProgress)?;

        if self.staged().is_none_or(<[u8]>::is_empty) {
            return self.abort();
        }

        let added_offset = crate::enums::to_u64(self.table.added.len())?;

        let (offset, kind, edit_seq, content, consumption) = match self.table.live_mut(staging.id) {
            Piece::InProgress {
                offset,
                kind,
                edit_seq,
                content,
                consumption,
            } => (
                *offset,
                *kind,
                *edit_seq,
                std::mem::take(content),
                std::mem::take(consumption),
            ),
            _ => unreachable!("staging id always names the staging piece"),
        };
        let len = content.len() as u64;

        self.table.added.extend_from_slice(&content);
        self.table.arena.replace(
            staging.id,
            Piece::Added {
                offset: added_offset,
                length: len,
                modified: 0,
                kind,
                edit_seq,
            },
        );
        self.history.record(EditRecord {
            piece: staging.id,
            kind,
            edit_seq,
            offset,
            added_offset,
            len,
            consumption,
        });
        self.staging = None;

        log::debug!("edit #{edit_seq} committed: {len} bytes at {offset} ({kind:?})");

        self.changed(ChangeEvent::Committed { offset, len, kind });

        Ok(())
    }

    /// Throws the edit in progress away and puts back everything it
    /// overwrote. A redo branch discarded when the edit began stays gone.
    ///
    /// # Errors
    ///
    /// [`EditError::NoEditInProgress`] while idle.
    pub fn abort(&mut self) -> EditResult<()> {
        let staging = self.staging.take().ok_or(EditError::NoEditInProgress)?;

        let (offset, consumption) = match self.table.live_mut(staging.id) {
            Piece::InProgress {
                offset,
                consumption,
                ..
            } => (*offset, std::mem::take(consumption)),
            _ => unreachable!("staging id always names the staging piece"),
        };

        let mut at = staging.index + 1;

        for record in &consumption {
            let piece = self.table.live_mut(record.piece);

            piece.extend_front(record.consumed);
            debug_assert_eq!(piece.modified(), record.pre_edit_modified);

            if record.fully_consumed && !piece.is_empty() {
                self.table.insert_ids(at, &[record.piece]);
                at += 1;
            }
        }

        self.table.remove_at(staging.index);
        self.table.arena.retire(staging.id);

        if staging.index > 0 {
            self.table.join_at(staging.index - 1);
        }

        log::debug!("edit at {offset} aborted");

        self.changed(ChangeEvent::Aborted { offset });

        Ok(())
    }

    /// Trims one byte off the neighbor after the staging piece, stepping over
    /// neighbors that are already empty.
    fn consume_one(&mut self, staging: Staging) {
        let next_index = staging.index + 1;

        loop {
            let current = self
                .consumption_mut(staging.id)
                .last()
                .copied()
                .filter(|record| !record.fully_consumed);

            let target = match current {
                Some(record) => record.piece,
                None => {
                    let Some(&next) = self.table.ids().get(next_index) else {
                        // end of document
                        return;
                    };
                    let pre_edit_modified = self.table.live(next).modified();

                    self.consumption_mut(staging.id).push(Consumption {
                        piece: next,
                        pre_edit_modified,
                        consumed: 0,
                        fully_consumed: false,
                        widened: 0,
                    });

                    next
                }
            };

            debug_assert_eq!(self.table.ids().get(next_index), Some(&target));

            if self.table.live(target).is_empty() {
                self.table.remove_at(next_index);
                self.last_consumption_mut(staging.id).fully_consumed = true;

                continue;
            }

            let piece = self.table.live_mut(target);

            piece.shrink_front(1);

            let exhausted = piece.is_empty();

            if exhausted {
                self.table.remove_at(next_index);
            }

            let record = self.last_consumption_mut(staging.id);

            record.consumed += 1;
            record.fully_consumed = exhausted;

            return;
        }
    }

    /// Gives one byte back to the most recently consumed neighbor.
    fn unconsume_one(&mut self, staging: Staging) {
        let next_index = staging.index + 1;

        self.drop_empty_consumption(staging.id);

        let Some(record) = self.consumption_mut(staging.id).last().copied() else {
            return;
        };

        self.table.live_mut(record.piece).extend_front(1);

        if record.fully_consumed {
            self.table.insert_ids(next_index, &[record.piece]);
        }

        let last = self.last_consumption_mut(staging.id);

        last.consumed -= 1;
        last.fully_consumed = false;

        if last.consumed == 0 {
            self.consumption_mut(staging.id).pop();
            self.drop_empty_consumption(staging.id);
        }
    }

    /// Pops trailing records that trimmed nothing: neighbors found already
    /// empty. They stay out of the list.
    fn drop_empty_consumption(&mut self, id: PieceId) {
        let consumption = self.consumption_mut(id);

        while consumption.last().is_some_and(|record| record.consumed == 0) {
            consumption.pop();
        }
    }

    fn consumption_mut(&mut self, id: PieceId) -> &mut Vec<Consumption> {
        match self.table.live_mut(id) {
            Piece::InProgress { consumption, .. } => consumption,
            _ => unreachable!("staging id always names the staging piece"),
        }
    }

    fn last_consumption_mut(&mut self, id: PieceId) -> &mut Consumption {
        self.consumption_mut(id)
            .last_mut()
            .expect("a consumption record was pushed for this neighbor")
    }
}

/*

====================================
=========== UNDO / REDO ============
====================================

*/

impl EditController {
    /// Reverts the most recent edit, committing a staging edit first.
    /// Returns `false` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Only if committing the staging edit fails.
    pub fn undo(&mut self) -> EditResult<bool> {
        if self.staging.is_some() {
            self.commit()?;
        }

        let Some(mut record) = self.history.take_for_undo() else {
            return Ok(false);
        };

        let leaves = self.table.arena.resolve(record.piece);
        let index = leaves
            .first()
            .and_then(|first| self.table.position_of(*first))
            .expect("an undoable edit is in the piece list");

        debug_assert_eq!(&self.table.ids()[index..index + leaves.len()], leaves.as_slice());

        self.table.remove_range(index..index + leaves.len());

        let mut at = index;

        for consumption in &mut record.consumption {
            if consumption.fully_consumed {
                let piece = self.table.live_mut(consumption.piece);

                consumption.widened = piece.extend_front(consumption.consumed);
                debug_assert_eq!(piece.modified(), consumption.pre_edit_modified);

                if !piece.is_empty() {
                    self.table.insert_ids(at, &[consumption.piece]);
                    at += 1;
                }
            } else {
                let front = self.front_of(consumption.piece);

                debug_assert_eq!(self.table.ids().get(at), Some(&front));

                consumption.widened = self
                    .table
                    .live_mut(front)
                    .extend_front(consumption.consumed);
            }
        }

        let offset = record.offset;

        log::debug!(
            "undid edit #{} ({} bytes at {offset}, {} restored)",
            record.edit_seq,
            record.len,
            record.consumed()
        );

        self.history.push_redo(record);
        self.changed(ChangeEvent::Undone { offset });

        Ok(true)
    }

    /// Re-applies the most recently undone edit. Returns `false` when there
    /// is nothing to redo.
    ///
    /// # Errors
    ///
    /// [`EditError::OutOfBounds`] if the document no longer reaches the
    /// edit's offset, which only a broken history could cause.
    pub fn redo(&mut self) -> EditResult<bool> {
        let Some(mut record) = self.history.take_for_redo() else {
            return Ok(false);
        };

        debug_assert!(self.staging.is_none(), "staging always rolls back redo");

        let Some(index) = self.table.split_point(record.offset) else {
            let err = EditError::OutOfBounds {
                offset: record.offset,
                len: self.len(),
            };

            self.history.push_redo(record);

            return Err(err);
        };

        for consumption in &mut record.consumption {
            if consumption.fully_consumed {
                if self.table.ids().get(index) == Some(&consumption.piece) {
                    self.table.remove_at(index);
                    reconsume(self.table.live_mut(consumption.piece), consumption);
                } else {
                    debug_assert!(self.table.live(consumption.piece).is_empty());
                }
            } else {
                let front = self.front_of(consumption.piece);

                debug_assert_eq!(self.table.ids().get(index), Some(&front));

                reconsume(self.table.live_mut(front), consumption);
            }
        }

        let leaves = self.table.arena.resolve(record.piece);

        self.table.insert_ids(index, &leaves);

        let offset = record.offset;

        log::debug!(
            "redid edit #{} ({} bytes at {offset})",
            record.edit_seq,
            record.len
        );

        self.history.push_undo(record);
        self.changed(ChangeEvent::Redone { offset });

        Ok(true)
    }

    /// Discards every redoable edit and the tail of the added buffer they
    /// wrote, then joins pieces that were only split on their account.
    fn rollback(&mut self) -> EditResult<()> {
        let discarded = self.history.discard_redo();
        let dropped: u64 = discarded.iter().map(|record| record.len).sum();

        for record in &discarded {
            for leaf in self.table.arena.resolve(record.piece) {
                self.table.arena.retire(leaf);
            }

            self.table.arena.retire(record.piece);
        }

        let keep = crate::enums::to_u64(self.table.added.len())?
            .checked_sub(dropped)
            .ok_or(crate::enums::MathError::Overflow)?;

        debug_assert!(discarded.iter().all(|record| record.added_offset >= keep));

        self.table.truncate_added(crate::enums::to_usize(keep)?);

        let joins = self.table.coalesce();

        log::debug!(
            "rolled back {} edits ({dropped} bytes), {joins} pieces rejoined",
            discarded.len()
        );

        Ok(())
    }

    /// The live piece now holding the front of what `id` once covered.
    fn front_of(&self, id: PieceId) -> PieceId {
        self.table
            .arena
            .resolve(id)
            .first()
            .copied()
            .expect("a consumed neighbor still covers bytes")
    }
}

/// Trims a neighbor the way its edit did, inverting the last undo exactly:
/// the widened part goes back through the window and only the rest through
/// the trim.
fn reconsume(piece: &mut Piece, consumption: &mut Consumption) {
    piece.narrow_front(consumption.widened);
    piece.shrink_front(consumption.consumed - consumption.widened);
    consumption.widened = 0;
}

/*

====================================
============= SEARCH ===============
====================================

*/

impl EditController {
    /// Absolute offsets of every non-overlapping occurrence of `pattern` in
    /// `[from, from + max_length)`, or to the end of the document.
    ///
    /// # Errors
    ///
    /// [`SearchError::EmptyPattern`] for an empty pattern.
    pub fn find(
        &self,
        pattern: &[u8],
        from: u64,
        max_length: Option<u64>,
    ) -> Result<Vec<u64>, SearchError> {
        if pattern.is_empty() {
            return Err(SearchError::EmptyPattern);
        }

        let length = max_length.unwrap_or_else(|| self.len().saturating_sub(from));
        let window = self.table.render(from, length)?;
        let found = crate::search::find_all(&window.bytes, pattern, self.config.search_match_limit);

        if found.truncated {
            log::warn!(
                "search stopped after {} matches; results are partial",
                found.positions.len()
            );
        }

        found
            .positions
            .into_iter()
            .map(|position| -> Result<u64, SearchError> {
                Ok(crate::enums::to_u64(position)? + from)
            })
            .collect()
    }

    /// Parses `text` as `search_type` and searches for the resulting bytes.
    ///
    /// # Errors
    ///
    /// Any [`SearchError`] from parsing; nothing is searched in that case.
    pub fn find_text(
        &self,
        text: &str,
        search_type: crate::search::pattern::SearchType,
        endianness: crate::search::pattern::Endianness,
        from: u64,
        max_length: Option<u64>,
    ) -> Result<Vec<u64>, SearchError> {
        let pattern = crate::search::pattern::parse_pattern(text, search_type, endianness)?;

        self.find(&pattern, from, max_length)
    }
}
