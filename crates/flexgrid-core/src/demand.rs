//! Point-to-point bandwidth demands.

use rustc_hash::FxHashSet;

use crate::{
    network::{Network, NodeId},
    units::{Gbps, Tier},
};

identifier!(DemandId, usize);

/// A bandwidth request between two nodes. The pair is unordered.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Demand {
    pub id: DemandId,
    pub src: NodeId,
    pub dst: NodeId,
    pub volume: Gbps,
}

impl Demand {
    pub fn new(id: DemandId, src: NodeId, dst: NodeId, volume: impl Into<Gbps>) -> Self {
        Self {
            id,
            src,
            dst,
            volume: volume.into(),
        }
    }

    /// The volume normalized onto the tier grid.
    pub fn tier(&self) -> Tier {
        Tier::normalize(self.volume)
    }

    /// The endpoints, smaller ID first.
    pub fn pair(&self) -> (NodeId, NodeId) {
        if self.src <= self.dst {
            (self.src, self.dst)
        } else {
            (self.dst, self.src)
        }
    }
}

/// Checks a list of demands against a network.
///
/// Correctness properties:
///
/// - Every demand must have a unique ID.
/// - Every demand must have distinct endpoints in `network`.
/// - Every volume must be finite and non-negative.
///
/// Repeated node pairs are accepted.
pub fn validate(network: &Network, demands: &[Demand]) -> Result<(), DemandError> {
    let mut ids = FxHashSet::default();
    for &Demand {
        id,
        src,
        dst,
        volume,
    } in demands
    {
        // CORRECTNESS: Every demand must have a unique ID.
        if !ids.insert(id) {
            return Err(DemandError::DuplicateId(id));
        }
        // CORRECTNESS: Every demand must have distinct endpoints in `network`.
        if src == dst {
            return Err(DemandError::SelfLoop { demand: id, node: src });
        }
        for node in [src, dst] {
            if !network.contains(node) {
                return Err(DemandError::UnknownNode { demand: id, node });
            }
        }
        // CORRECTNESS: Every volume must be finite and non-negative.
        if !volume.is_finite() || volume < Gbps::ZERO {
            return Err(DemandError::InvalidVolume { demand: id, volume });
        }
    }
    Ok(())
}

/// Invalid demand.
#[derive(Debug, thiserror::Error)]
pub enum DemandError {
    /// Two demands share an ID.
    #[error("duplicate demand ID {0}")]
    DuplicateId(DemandId),

    /// A demand starts and ends at the same node.
    #[error("demand {demand} starts and ends at {node}")]
    SelfLoop {
        /// The demand ID.
        demand: DemandId,
        /// The repeated endpoint.
        node: NodeId,
    },

    /// A demand references a node missing from the network.
    #[error("demand {demand} references unknown node {node}")]
    UnknownNode {
        /// The demand ID.
        demand: DemandId,
        /// The unknown endpoint.
        node: NodeId,
    },

    /// A demand volume is negative or not finite.
    #[error("demand {demand} has invalid volume {volume}")]
    InvalidVolume {
        /// The demand ID.
        demand: DemandId,
        /// The offending volume.
        volume: Gbps,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn network() -> Network {
        let (nodes, links) = testing::square_config();
        Network::new(&nodes, &links, 8).unwrap()
    }

    fn demand(id: usize, src: usize, dst: usize) -> Demand {
        Demand::new(DemandId::new(id), NodeId::new(src), NodeId::new(dst), 100.0)
    }

    #[test]
    fn valid_demands_succeed() {
        // Repeated pairs in either orientation are fine
        let demands = [demand(0, 0, 3), demand(1, 3, 0), demand(2, 1, 2)];
        assert!(validate(&network(), &demands).is_ok());
    }

    #[test]
    fn duplicate_id_fails() {
        let demands = [demand(0, 0, 3), demand(0, 1, 2)];
        let res = validate(&network(), &demands);
        assert!(matches!(res, Err(DemandError::DuplicateId(..))));
    }

    #[test]
    fn self_loop_fails() {
        let res = validate(&network(), &[demand(0, 2, 2)]);
        assert!(matches!(res, Err(DemandError::SelfLoop { .. })));
    }

    #[test]
    fn unknown_node_fails() {
        let res = validate(&network(), &[demand(0, 2, 9)]);
        assert!(matches!(res, Err(DemandError::UnknownNode { .. })));
    }

    #[test]
    fn invalid_volume_fails() {
        let with_volume = |v: f64| Demand::new(DemandId::ZERO, NodeId::new(0), NodeId::new(3), v);
        for v in [f64::INFINITY, f64::NAN, -1.0] {
            let res = validate(&network(), &[with_volume(v)]);
            assert!(matches!(res, Err(DemandError::InvalidVolume { .. })), "{v}");
        }
        // Zero and very large finite volumes pass; the modulation table decides on them
        assert!(validate(&network(), &[with_volume(0.0)]).is_ok());
        assert!(validate(&network(), &[with_volume(1e12)]).is_ok());
    }

    #[test]
    fn pair_is_unordered() {
        assert_eq!(demand(0, 3, 1).pair(), demand(1, 1, 3).pair());
    }

    #[test]
    fn tier_uses_the_rounding_rule() {
        let d = |v: f64| Demand::new(DemandId::ZERO, NodeId::new(0), NodeId::new(1), v);
        assert_eq!(d(40.0).tier(), Tier::new(100));
        assert_eq!(d(250.0).tier(), Tier::new(300));
    }
}
