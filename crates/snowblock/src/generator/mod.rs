mod block;
mod mutex;
mod node;
mod overflow;

pub use block::*;
pub(crate) use mutex::*;
pub use node::SnowflakeNode;
pub(crate) use node::NodeState;
pub use overflow::*;
