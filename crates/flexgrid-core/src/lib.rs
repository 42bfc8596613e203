#![warn(unreachable_pub, missing_debug_implementations)]

//! The core flexgrid library. This crate defines the data model of an elastic optical network,
//! candidate path generation, modulation format selection, the spectrum allocator, the
//! [protection policy interface](ProtectionPolicy), and [the routine](run::run) that ties them
//! together.

#[macro_use]
mod ident;

pub mod accounting;
pub mod demand;
pub mod modulation;
pub mod network;
pub mod protection;
pub mod risk;
pub mod routing;
pub mod spectrum;
pub mod units;

mod run;
mod spec;

pub(crate) mod utils;

#[doc(hidden)]
pub mod testing;

pub use accounting::{relative_savings, transponder_count, Report, TransponderModel};
pub use demand::{Demand, DemandError, DemandId};
pub use modulation::{FormatFallback, ModulationError, ModulationFormat, ModulationTable};
pub use network::{Link, LinkId, Network, Node, NodeId, Path, TopologyError};
pub use protection::{
    AllocationPlan, AllocationRecord, Assignment, Commitment, Instance, PolicyError,
    ProtectionPolicy,
};
pub use risk::{LinkRiskGrouping, NodeRiskGrouping, RiskElement, RiskGroup, RiskGroupId, RiskGrouping};
pub use routing::CandidatePaths;
pub use run::{provision, provision_on, run, Error, Outcome};
pub use spec::{Spec, SpecError};
pub use spectrum::{AvailabilityScope, SlotWindow, Spectrum, SpectrumError};
pub use units::{Gbps, Kilometers, Tier};
