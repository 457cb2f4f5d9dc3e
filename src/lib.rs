//! stockpath: hierarchical location inventory
//!
//! Tracks how many of each item type sit at each place in a tree of
//! locations (`Lab/Bench3/Drawer1`), per category, in a local SQLite file.

pub mod cli;
pub mod core;
