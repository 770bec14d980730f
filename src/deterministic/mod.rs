//! Ordered containers whose iteration order is fixed by a comparator.
//!
//! Every collection that reaches the wire is one of these, so two nodes that
//! hold the same entries always walk them in the same order no matter how the
//! entries were inserted.

pub mod comparator;
pub mod map;
pub mod set;

pub use comparator::{Comparator, NaturalOrder};
pub use map::DeterministicMap;
pub use set::DeterministicSet;
