use crate::piece_table::piece::{Piece, PieceId};

#[derive(Debug)]
enum Slot {
    Live(Piece),
    /// The piece was split or joined away; its identity now stands for
    /// these newer pieces, in document order. Empty once retired.
    Forward(Vec<PieceId>),
}

/// Owns every piece ever created, addressed by [`PieceId`].
///
/// Slots are never reused, so an id handed to a history record keeps meaning
/// "the bytes that piece covered" for the lifetime of the arena. Every split,
/// join and staging piece takes a fresh slot; only [`PieceArena::compact`]
/// gives them back.
#[derive(Debug, Default)]
pub struct PieceArena {
    slots: Vec<Slot>,
}

impl PieceArena {
    pub fn alloc(&mut self, piece: Piece) -> PieceId {
        self.slots.push(Slot::Live(piece));

        PieceId(self.slots.len() - 1)
    }

    #[inline]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        match self.slots.get(id.0)? {
            Slot::Live(piece) => Some(piece),
            Slot::Forward(_) => None,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        match self.slots.get_mut(id.0)? {
            Slot::Live(piece) => Some(piece),
            Slot::Forward(_) => None,
        }
    }

    /// Swaps the contents of a live slot, keeping its identity.
    pub fn replace(&mut self, id: PieceId, piece: Piece) -> Option<Piece> {
        match self.slots.get_mut(id.0)? {
            Slot::Live(current) => Some(std::mem::replace(current, piece)),
            Slot::Forward(_) => None,
        }
    }

    /// Turns `id` into a forwarding record for `targets`.
    pub fn forward(&mut self, id: PieceId, targets: Vec<PieceId>) {
        debug_assert!(
            targets.iter().all(|target| target.0 > id.0),
            "forwarding must point at newer pieces"
        );

        if let Some(slot) = self.slots.get_mut(id.0) {
            *slot = Slot::Forward(targets);
        }
    }

    /// Drops a piece for good. Resolving it afterwards yields nothing.
    pub fn retire(&mut self, id: PieceId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            *slot = Slot::Forward(Vec::new());
        }
    }

    #[inline]
    pub fn is_live(&self, id: PieceId) -> bool {
        matches!(self.slots.get(id.0), Some(Slot::Live(_)))
    }

    /// Follows forwarding records to the live pieces `id` now stands for, in
    /// document order. Two halves later joined back resolve to the one
    /// joined piece.
    pub fn resolve(&self, id: PieceId) -> Vec<PieceId> {
        let mut out = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            match self.slots.get(current.0) {
                Some(Slot::Live(_)) => {
                    if !out.contains(&current) {
                        out.push(current);
                    }
                }
                Some(Slot::Forward(targets)) => stack.extend(targets.iter().rev()),
                None => {}
            }
        }

        out
    }

    /// Rebuilds the arena around the live pieces in `keep`, dropping every
    /// other slot, and returns their new ids in the same order. Every id not
    /// in `keep` is meaningless afterwards.
    pub fn compact(&mut self, keep: &[PieceId]) -> Vec<PieceId> {
        let mut old = std::mem::take(&mut self.slots);
        let mut ids = Vec::with_capacity(keep.len());

        for id in keep {
            if let Some(slot) = old.get_mut(id.0)
                && let Slot::Live(piece) = std::mem::replace(slot, Slot::Forward(Vec::new()))
            {
                ids.push(self.alloc(piece));
            }
        }

        ids
    }

    /// Number of slots allocated since creation or the last compaction,
    /// live or not.
    #[inline]
    pub fn capacity_used(&self) -> usize {
        self.slots.len()
    }
}
