pub mod arena;
pub mod heap;
pub mod index;
pub mod shard;

pub use arena::{NodeArena, Record, SlotId};
pub use heap::PriorityHeap;
pub use index::KeyIndex;
pub use shard::{fnv1a_64, ShardSelector};
