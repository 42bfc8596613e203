//! Synthetic traffic.

use flexgrid_core::{Demand, DemandId, Gbps, Network};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::Error;

/// Options for [`generate_demands`].
#[derive(Debug, Clone, typed_builder::TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct TrafficOpts {
    /// Probability that a node pair carries no demand.
    #[builder(default = 0.2)]
    pub deletion: f64,
    /// Volumes to draw from, uniformly.
    #[builder(default = TrafficOpts::default_volumes())]
    pub volumes: Vec<Gbps>,
}

impl TrafficOpts {
    /// 100 to 1000 Gbps in steps of 100.
    pub fn default_volumes() -> Vec<Gbps> {
        (1..=10).map(|i| Gbps::new(f64::from(i * 100))).collect()
    }
}

impl Default for TrafficOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Draws at most one demand per unordered node pair.
///
/// Pairs are visited in ascending `(src, dst)` order with `src < dst`. Each pair survives with
/// probability `1 - opts.deletion` and then gets a volume chosen uniformly from `opts.volumes`.
/// Demand IDs are assigned in visiting order, so the same seed gives the same demands.
pub fn generate_demands(
    network: &Network,
    opts: &TrafficOpts,
    mut rng: impl Rng,
) -> Result<Vec<Demand>, Error> {
    if !(0.0..=1.0).contains(&opts.deletion) {
        return Err(Error::InvalidDeletion(opts.deletion));
    }
    if opts.volumes.is_empty() {
        return Err(Error::NoVolumes);
    }
    let mut nodes = network.nodes().map(|n| n.id).collect::<Vec<_>>();
    nodes.sort();

    let mut demands = Vec::new();
    for (i, &src) in nodes.iter().enumerate() {
        for &dst in &nodes[i + 1..] {
            if rng.gen::<f64>() <= opts.deletion {
                continue;
            }
            // `volumes` is non-empty
            if let Some(&volume) = opts.volumes.choose(&mut rng) {
                demands.push(Demand::new(DemandId::new(demands.len()), src, dst, volume));
            }
        }
    }
    log::debug!(
        "Generated {} demands over {} node pairs",
        demands.len(),
        nodes.len() * nodes.len().saturating_sub(1) / 2
    );
    Ok(demands)
}

/// How each demand's volume is divided between service classes.
#[derive(Debug, Clone, Copy, typed_builder::TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct ClassShares {
    /// Share protected by dedicated paths.
    #[builder(default = 0.6)]
    pub dedicated: f64,
    /// Share protected by switchover.
    #[builder(default = 0.2)]
    pub switchover: f64,
    /// Share protected by shared backups.
    #[builder(default = 0.2)]
    pub shared: f64,
}

impl Default for ClassShares {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Demands per service class. Every list holds one demand per input demand, with the same ID.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ServiceClasses {
    /// Dedicated-protection demands.
    pub dedicated: Vec<Demand>,
    /// Switchover demands.
    pub switchover: Vec<Demand>,
    /// Shared-backup demands.
    pub shared: Vec<Demand>,
}

/// Splits every demand into one demand per service class, scaling its volume by the class share.
///
/// Shares need not sum to one.
pub fn split_classes(demands: &[Demand], shares: ClassShares) -> Result<ServiceClasses, Error> {
    for share in [shares.dedicated, shares.switchover, shares.shared] {
        if !share.is_finite() || share < 0.0 {
            return Err(Error::InvalidShare(share));
        }
    }
    let scaled = |share: f64| {
        demands
            .iter()
            .map(|d| Demand {
                volume: d.volume.scale_by(share),
                ..*d
            })
            .collect::<Vec<_>>()
    };
    Ok(ServiceClasses {
        dedicated: scaled(shares.dedicated),
        switchover: scaled(shares.switchover),
        shared: scaled(shares.shared),
    })
}
