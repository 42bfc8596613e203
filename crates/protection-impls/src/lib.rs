//! This crate contains implementations of the
//! [`ProtectionPolicy`](flexgrid_core::ProtectionPolicy) trait. Each policy routes every demand
//! on its candidate paths and commits spectrum for the primary and, depending on the policy, a
//! backup.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

pub mod dedicated;
pub mod shared;
pub mod switchover;

mod utils;

pub use crate::dedicated::{DedicatedProtection, FitMode};
pub use crate::shared::{BackupFallback, SharedBackupProtection};
pub use crate::switchover::SwitchoverProtection;
