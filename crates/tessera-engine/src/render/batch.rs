use std::fmt;

use super::vertex::{Quad, Vertex};

/// Which batch a quad belongs to.
///
/// The variant order is the flush order used at the end of a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum QuadType {
    /// Solid fill, zero texture coordinates.
    Colored,
    /// Sampled from a bound image texture.
    Textured,
    /// Sampled from the font atlas.
    Text,
}

impl QuadType {
    /// All kinds, in flush order.
    pub const ALL: [QuadType; 3] = [QuadType::Colored, QuadType::Textured, QuadType::Text];

    /// Whether the fragment stage should sample the bound texture.
    #[inline]
    pub const fn is_textured(self) -> bool {
        !matches!(self, QuadType::Colored)
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            QuadType::Colored => 0,
            QuadType::Textured => 1,
            QuadType::Text => 2,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BatchError {
    /// The batch holds `capacity` quads already; flush before pushing.
    Full { kind: QuadType, capacity: usize },
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Full { kind, capacity } => {
                write!(f, "{kind:?} batch is full ({capacity} quads)")
            }
        }
    }
}

impl std::error::Error for BatchError {}

/// Fixed-capacity CPU staging area for quads of one kind.
///
/// Storage is allocated once. Slots past `used` are always zeroed.
#[derive(Debug, Clone)]
pub struct QuadBatch {
    kind: QuadType,
    quads: Vec<Quad>,
    used: usize,
}

impl QuadBatch {
    /// Creates an empty batch. A zero capacity is raised to one.
    pub fn new(kind: QuadType, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            kind,
            quads: vec![Quad::default(); capacity],
            used: 0,
        }
    }

    #[inline]
    pub fn kind(&self) -> QuadType {
        self.kind
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.quads.len()
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.used == self.quads.len()
    }

    /// Stores `quad` in the next free slot.
    pub fn push(&mut self, quad: Quad) -> Result<(), BatchError> {
        if self.is_full() {
            return Err(BatchError::Full {
                kind: self.kind,
                capacity: self.capacity(),
            });
        }
        self.quads[self.used] = quad;
        self.used += 1;
        Ok(())
    }

    /// The occupied prefix of the storage.
    pub fn quads(&self) -> &[Quad] {
        &self.quads[..self.used]
    }

    /// The occupied prefix as a flat vertex slice, six vertices per quad.
    pub fn vertices(&self) -> &[Vertex] {
        bytemuck::cast_slice(self.quads())
    }

    /// Zeroes the occupied slots and resets the count.
    pub fn reset(&mut self) {
        self.quads[..self.used].fill(Quad::default());
        self.used = 0;
    }
}
