//! Protection policy implementations.

pub use protection_impls::*;
