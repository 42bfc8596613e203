//! Topology and demand files, and synthetic traffic.

pub use flexgrid_utils::*;
