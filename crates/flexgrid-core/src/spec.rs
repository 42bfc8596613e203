//! This module defines run specifications ([`Spec`]), which consist of a topology, demands, and
//! allocation parameters.

use crate::{
    demand::{self, Demand, DemandError},
    modulation::ModulationTable,
    network::{Link, Network, Node, TopologyError},
};

/// A run specification.
#[derive(Debug, typed_builder::TypedBuilder)]
pub struct Spec {
    /// Topology nodes.
    pub nodes: Vec<Node>,
    /// Topology links.
    pub links: Vec<Link>,
    /// Traffic demands.
    pub demands: Vec<Demand>,
    /// Spectrum slots per link.
    #[builder(default = 400)]
    pub nr_slots: usize,
    /// Maximum number of backup candidates kept per node pair.
    #[builder(default = 10)]
    pub max_candidates: usize,
    /// Modulation formats per tier.
    #[builder(default)]
    pub modulation: ModulationTable,
}

impl Spec {
    /// Validate a specification, producing a `ValidSpec`.
    ///
    /// Correctness properties:
    ///
    /// - The topology must satisfy the properties listed in `Network::new()`.
    /// - The demands must satisfy the properties listed in `demand::validate()`.
    pub(crate) fn validate(self) -> Result<ValidSpec, SpecError> {
        let network = Network::new(&self.nodes, &self.links, self.nr_slots)?;
        demand::validate(&network, &self.demands)?;
        Ok(ValidSpec {
            network,
            demands: self.demands,
            max_candidates: self.max_candidates,
            modulation: self.modulation,
        })
    }
}

/// A `ValidSpec` is a `Spec` that has been validated.
#[derive(Debug)]
pub(crate) struct ValidSpec {
    pub(crate) network: Network,
    pub(crate) demands: Vec<Demand>,
    pub(crate) max_candidates: usize,
    pub(crate) modulation: ModulationTable,
}

/// Run specification error.
#[derive(Debug, thiserror::Error)]
pub enum SpecError {
    /// The topology is invalid.
    #[error("invalid topology")]
    InvalidTopology(#[from] TopologyError),

    /// A demand is invalid.
    #[error("invalid demand")]
    InvalidDemand(#[from] DemandError),
}
