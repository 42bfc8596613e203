//! Core flexgrid data structures, traits, and routines. The most common entry points are
//! [run()], which turns a [specification](Spec) into an [outcome](Outcome), and [provision()],
//! which reuses precomputed [candidate paths](CandidatePaths) across traffic instances.

pub use flexgrid_core::*;
