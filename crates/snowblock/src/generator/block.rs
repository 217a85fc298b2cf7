use core::iter::FusedIterator;

use crate::id::SnowflakeId;

/// A reserved, contiguous run of IDs that has not been materialised yet.
///
/// Produced by [`SnowflakeNode::generate_batch`]. A block carries the masks
/// that were in effect when it was reserved, so it can be expanded with a
/// [`BlockIterator`] without going back to the generator.
///
/// [`SnowflakeNode::generate_batch`]: crate::SnowflakeNode::generate_batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    first: SnowflakeId,
    count: i64,
    node_mask: i64,
    sequence_mask: i64,
}

impl Block {
    /// Describes a block of `count` IDs starting at `first`.
    ///
    /// `node_mask` is the shifted node field mask and `sequence_mask` the
    /// sequence field mask of the layout `first` was encoded with.
    ///
    /// The block must end at or before the largest encodable timestamp
    /// ([`Layout::time_max`]); blocks from
    /// [`SnowflakeNode::generate_batch`] always do. Past that point the
    /// timestamp wraps into the sign bit and IDs stop increasing.
    ///
    /// [`Layout::time_max`]: crate::Layout::time_max
    /// [`SnowflakeNode::generate_batch`]: crate::SnowflakeNode::generate_batch
    pub const fn new(first: SnowflakeId, count: i64, node_mask: i64, sequence_mask: i64) -> Self {
        Self {
            first,
            count,
            node_mask,
            sequence_mask,
        }
    }

    /// The first ID of the block.
    pub const fn first(&self) -> SnowflakeId {
        self.first
    }

    /// Number of IDs reserved. Zero or negative means empty.
    pub const fn count(&self) -> i64 {
        self.count
    }

    pub const fn node_mask(&self) -> i64 {
        self.node_mask
    }

    pub const fn sequence_mask(&self) -> i64 {
        self.sequence_mask
    }

    /// `true` if the block holds no IDs.
    pub const fn is_empty(&self) -> bool {
        self.count <= 0
    }

    /// Number of IDs in the block, treating invalid counts as empty.
    pub fn len(&self) -> usize {
        usize::try_from(self.count).unwrap_or(0)
    }

    /// A fresh iterator over the IDs in this block.
    pub fn iter(&self) -> BlockIterator {
        BlockIterator::new(*self)
    }
}

impl IntoIterator for Block {
    type Item = SnowflakeId;
    type IntoIter = BlockIterator;

    fn into_iter(self) -> Self::IntoIter {
        BlockIterator::new(self)
    }
}

impl IntoIterator for &Block {
    type Item = SnowflakeId;
    type IntoIter = BlockIterator;

    fn into_iter(self) -> Self::IntoIter {
        BlockIterator::new(*self)
    }
}

/// Lazily re-derives every ID of a [`Block`].
///
/// The first item is the block's `first` ID verbatim. Each following item bumps
/// the sequence, and when the sequence wraps the timestamp advances by one
/// millisecond. The result is exactly the IDs sequential single generation
/// would have produced for the same reservation.
///
/// Iteration is finite and not restartable; build a new iterator from the block
/// to go again.
///
/// # Example
///
/// ```
/// use snowblock::{Block, Layout};
///
/// let layout = Layout::TWITTER;
/// let first = layout.encode(10, 3, 4094);
/// let block = Block::new(first, 3, layout.node_mask(), layout.sequence_mask());
///
/// let ids: Vec<_> = block.into_iter().collect();
/// assert_eq!(ids, [first, layout.encode(10, 3, 4095), layout.encode(11, 3, 0)]);
/// ```
#[derive(Clone, Debug)]
pub struct BlockIterator {
    block: Block,
    produced: i64,
    time: i64,
    node: i64,
    sequence: i64,
    time_step: i64,
}

impl BlockIterator {
    /// Splits the block's first ID into its fields, once.
    pub fn new(block: Block) -> Self {
        let field_mask = block.node_mask | block.sequence_mask;
        let time_shift = block.node_mask.count_ones() + block.sequence_mask.count_ones();
        let time_step = 1_i64.checked_shl(time_shift).unwrap_or(0);

        let raw = block.first.to_raw();
        Self {
            block,
            produced: 0,
            time: raw & !field_mask,
            node: raw & block.node_mask,
            sequence: raw & block.sequence_mask,
            time_step,
        }
    }

    /// `true` once every ID of the block has been produced.
    pub const fn done(&self) -> bool {
        self.produced >= self.block.count
    }

    /// The block being iterated.
    pub const fn block(&self) -> &Block {
        &self.block
    }

    fn remaining(&self) -> usize {
        usize::try_from(self.block.count - self.produced).unwrap_or(0)
    }
}

impl Iterator for BlockIterator {
    type Item = SnowflakeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done() {
            return None;
        }

        if self.produced == 0 {
            self.produced = 1;
            return Some(self.block.first);
        }

        self.produced += 1;
        self.sequence = (self.sequence + 1) & self.block.sequence_mask;
        if self.sequence == 0 {
            self.time = self.time.wrapping_add(self.time_step);
        }

        Some(SnowflakeId::from_raw(self.time | self.node | self.sequence))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BlockIterator {}

impl FusedIterator for BlockIterator {}
