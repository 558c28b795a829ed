//! Buffered mutations for batch mode.
//!
//! Single-threaded cooperative scheduling means one global buffer slot is
//! enough to model "one batch in flight at a time" — there is no
//! per-caller isolation beyond that.

use crate::model::Node;

#[derive(Debug, Clone)]
pub enum BatchOp {
    CacheNode { node: Node, shard_path: String },
    RemoveNode { node: Node },
}

#[derive(Default)]
pub struct BatchBuffer {
    pub ops: Vec<BatchOp>,
}
