//! Storage layer: the durable checkpoint separating processed from
//! unprocessed feed records.

mod checkpoint;

pub use checkpoint::{CheckpointError, CheckpointStore};
