//! Grouping module.
//!
//! - Grouper: similarity sort and fixed-size partition
//! - Pipeline: read → enrich → group → write

pub mod grouper;
pub mod pipeline;

pub use grouper::{assign_groups, Group, Grouping, DEFAULT_GROUP_SIZE};
pub use pipeline::*;
