//! Snowflake-style 64-bit IDs with a configurable node/sequence split.
//!
//! A [`SnowflakeNode`] hands out IDs one at a time with
//! [`SnowflakeNode::generate`], or reserves a contiguous [`Block`] with
//! [`SnowflakeNode::generate_batch`]. Batches may run up to
//! `max_overflow_ms` milliseconds ahead of the clock; the returned
//! [`Overflow`] tells callers how long to back off.
//!
//! ```
//! use snowblock::{Config, SnowflakeNode};
//!
//! let node = SnowflakeNode::with_config(7, Config::default().with_max_overflow_ms(1)).unwrap();
//! let id = node.generate();
//! assert_eq!(node.layout().decode_node(id), 7);
//!
//! let (block, overflow) = node.generate_batch(5_000);
//! for id in &block {
//!     assert_eq!(node.layout().decode_node(id), 7);
//! }
//! overflow.wait_until_cleared();
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod error;
#[cfg(feature = "futures")]
mod futures;
mod generator;
mod id;
mod time;

pub use crate::config::*;
pub use crate::error::*;
#[cfg(feature = "futures")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
