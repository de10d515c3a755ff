//! The decoding-map client: greedy longest-match over a caller-supplied
//! trie.

/// A trie mapping byte-sequence keys to entity codes, walked one byte at a
/// time.
///
/// The map is opaque to the block reader: it only ever resets to the root,
/// asks for a branch on a byte, and queries the entity at the current node.
/// Implementations must behave as a deterministic trie — the same byte
/// sequence from the root always reaches the same node.
pub trait DecodingMap {
    /// Returns to the root node.
    fn reset(&mut self);

    /// Follows the branch for byte `b` if one exists from the current node.
    ///
    /// Returns `true` and advances on success; returns `false` and stays on
    /// the current node otherwise.
    fn branch(&mut self, b: u8) -> bool;

    /// The entity recorded at the current node, if any.
    fn entity(&self) -> Option<u64>;
}

impl<M: DecodingMap + ?Sized> DecodingMap for &mut M {
    fn reset(&mut self) {
        (**self).reset();
    }

    fn branch(&mut self, b: u8) -> bool {
        (**self).branch(b)
    }

    fn entity(&self) -> Option<u64> {
        (**self).entity()
    }
}

/// Marker for a matched prefix with no entity at its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct NoEntity;

/// Greedy longest-match walk over a [`DecodingMap`].
///
/// Bytes are fed one at a time. A byte that extends the current key is
/// absorbed; a byte that does not resolves the pending key to its entity,
/// resets to the root, and retries from there, so the walker only ever
/// consumes bytes that participate in a matched prefix.
#[derive(Debug)]
pub(crate) struct Walker<M> {
    map: M,
    /// Whether any branch has been taken since the last reset.
    pending: bool,
}

impl<M: DecodingMap> Walker<M> {
    pub(crate) fn new(mut map: M) -> Self {
        map.reset();
        Self {
            map,
            pending: false,
        }
    }

    /// Feeds one byte.
    ///
    /// Returns `Ok(Some(entity))` when the byte ended a match: `entity` is
    /// the resolution of the pending key and the byte has been absorbed as
    /// the start of the next key. Returns `Ok(None)` when the byte extended
    /// the current key. Fails when a key resolves without an entity, or
    /// when the byte matches nothing from the root.
    pub(crate) fn feed(&mut self, b: u8) -> Result<Option<u64>, NoEntity> {
        if self.map.branch(b) {
            self.pending = true;
            return Ok(None);
        }
        let entity = self.map.entity().ok_or(NoEntity)?;
        self.map.reset();
        if !self.map.branch(b) {
            return Err(NoEntity);
        }
        self.pending = true;
        Ok(Some(entity))
    }

    /// Resolves the pending key at end of input, if one exists.
    pub(crate) fn finish(self) -> Result<Option<u64>, NoEntity> {
        if !self.pending {
            return Ok(None);
        }
        self.map.entity().map(Some).ok_or(NoEntity)
    }
}
