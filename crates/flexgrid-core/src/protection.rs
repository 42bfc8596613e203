//! This module defines the interface shared by protection policies and the records they produce.
//!
//! A policy consumes an [`Instance`] (topology, candidate paths, modulation table, and demands)
//! and commits spectrum on a [`Spectrum`] handle. The result is an [`AllocationPlan`] holding one
//! [`AllocationRecord`] per demand, in demand order.

use crate::{
    accounting::TransponderModel,
    demand::{Demand, DemandError, DemandId},
    modulation::{ModulationError, ModulationTable},
    network::{Network, Path},
    risk::RiskGroupId,
    routing::CandidatePaths,
    spectrum::{SlotWindow, Spectrum, SpectrumError},
    units::Tier,
};

/// The trait that must be implemented by all protection policies.
pub trait ProtectionPolicy {
    /// A short name used in reports and logs.
    fn name(&self) -> &str;

    /// How transponders are counted for plans produced by this policy.
    fn transponder_model(&self) -> TransponderModel;

    /// Routes and protects every demand of `instance`, committing spectrum on `spectrum`.
    fn protect(
        &self,
        instance: &Instance<'_>,
        spectrum: &mut Spectrum,
    ) -> Result<AllocationPlan, PolicyError>;
}

impl<P: ProtectionPolicy + ?Sized> ProtectionPolicy for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn transponder_model(&self) -> TransponderModel {
        (**self).transponder_model()
    }

    fn protect(
        &self,
        instance: &Instance<'_>,
        spectrum: &mut Spectrum,
    ) -> Result<AllocationPlan, PolicyError> {
        (**self).protect(instance, spectrum)
    }
}

/// One traffic instance: everything a policy reads.
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct Instance<'a> {
    network: &'a Network,
    candidates: &'a CandidatePaths,
    modulation: &'a ModulationTable,
    demands: &'a [Demand],
}

impl<'a> Instance<'a> {
    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn candidates(&self) -> &'a CandidatePaths {
        self.candidates
    }

    pub fn modulation(&self) -> &'a ModulationTable {
        self.modulation
    }

    pub fn demands(&self) -> &'a [Demand] {
        self.demands
    }

    /// Candidate paths of `demand`, primary first. Empty if its endpoints are disconnected.
    pub fn candidates_for(&self, demand: &Demand) -> &'a [Path] {
        self.candidates.get(demand.src, demand.dst)
    }

    /// Slots `path` needs for `tier`, or `None` if the modulation table rejects the path as out
    /// of reach.
    pub fn slots_for(&self, path: &Path, tier: Tier) -> Result<Option<usize>, PolicyError> {
        match self.modulation.select(path, tier) {
            Ok(slots) => Ok(Some(slots)),
            Err(ModulationError::Unreachable { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// How a path holds its spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Commitment {
    /// The window is occupied by this path alone.
    Exclusive(SlotWindow),
    /// The window is occupied once and referenced by every member of a risk group that uses it.
    Shared {
        /// The group whose members share the reservation.
        group: RiskGroupId,
        /// The shared window.
        window: SlotWindow,
    },
    /// Nothing is occupied. `probe` is where first-fit would have placed the path at the time it
    /// was chosen.
    Unreserved {
        /// The first-fit window at selection time, if there was one.
        probe: Option<SlotWindow>,
    },
}

impl Commitment {
    /// The window held on the spectrum, if any.
    pub fn reserved_window(&self) -> Option<SlotWindow> {
        match *self {
            Commitment::Exclusive(window) | Commitment::Shared { window, .. } => Some(window),
            Commitment::Unreserved { .. } => None,
        }
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved_window().is_some()
    }
}

/// A path chosen for a demand, with its slot cost and spectrum commitment.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, derive_new::new)]
pub struct Assignment {
    pub path: Path,
    pub slots: usize,
    pub commitment: Commitment,
}

/// The outcome for one demand.
///
/// A demand without a primary is blocked. A demand with a primary and no backup is unprotected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AllocationRecord {
    pub demand: DemandId,
    pub tier: Tier,
    pub primary: Option<Assignment>,
    pub backup: Option<Assignment>,
    /// Set when the primary failed and traffic was moved onto a backup, which is now recorded as
    /// the primary.
    pub failed_over: bool,
}

impl AllocationRecord {
    pub fn blocked(demand: DemandId, tier: Tier) -> Self {
        Self {
            demand,
            tier,
            primary: None,
            backup: None,
            failed_over: false,
        }
    }

    pub fn new(
        demand: DemandId,
        tier: Tier,
        primary: Assignment,
        backup: Option<Assignment>,
    ) -> Self {
        Self {
            demand,
            tier,
            primary: Some(primary),
            backup,
            failed_over: false,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.primary.is_none()
    }

    pub fn is_unprotected(&self) -> bool {
        self.primary.is_some() && self.backup.is_none()
    }

    /// The primary and backup, whichever are present.
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.primary.iter().chain(self.backup.iter())
    }
}

/// The records a policy produced for a traffic instance.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AllocationPlan {
    policy: String,
    records: Vec<AllocationRecord>,
}

impl AllocationPlan {
    pub fn new(policy: impl Into<String>) -> Self {
        Self {
            policy: policy.into(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: AllocationRecord) {
        self.records.push(record);
    }

    pub fn policy(&self) -> &str {
        &self.policy
    }

    pub fn records(&self) -> &[AllocationRecord] {
        &self.records
    }

    pub fn get(&self, demand: DemandId) -> Option<&AllocationRecord> {
        self.records.iter().find(|r| r.demand == demand)
    }

    pub fn nr_blocked(&self) -> usize {
        self.records.iter().filter(|r| r.is_blocked()).count()
    }

    pub fn nr_unprotected(&self) -> usize {
        self.records.iter().filter(|r| r.is_unprotected()).count()
    }

    delegate::delegate! {
        to self.records {
            #[call(len)]
            pub fn nr_records(&self) -> usize;
        }
    }
}

/// Protection policy error.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("spectrum contract violated")]
    Spectrum(#[from] SpectrumError),

    #[error("failed to select a modulation format")]
    Modulation(#[from] ModulationError),

    #[error("invalid demand")]
    Demand(#[from] DemandError),
}
