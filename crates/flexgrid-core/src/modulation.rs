//! Modulation format selection. A format trades reach for spectral efficiency: for each bandwidth
//! tier the table lists `(max_reach, slots)` options, and a path uses the narrowest option whose
//! reach covers its length.

use std::collections::BTreeMap;

use crate::{
    network::Path,
    units::{Kilometers, Tier},
};

/// One modulation option for a tier.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, derive_new::new)]
pub struct ModulationFormat {
    /// Longest path this format can reach.
    pub max_reach: Kilometers,
    /// Spectrum slots needed to carry the tier's bandwidth.
    pub slots: usize,
}

/// What to do when no format reaches far enough.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FormatFallback {
    /// Charge a single slot. This understates the real spectral cost.
    #[default]
    SingleSlot,
    /// Report [`ModulationError::Unreachable`].
    Reject,
}

/// Tier-indexed table of modulation options.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ModulationTable {
    formats: BTreeMap<Tier, Vec<ModulationFormat>>,
    #[serde(default)]
    fallback: FormatFallback,
}

impl ModulationTable {
    /// Creates an empty table with the given fallback.
    pub fn new(fallback: FormatFallback) -> Self {
        Self {
            formats: BTreeMap::new(),
            fallback,
        }
    }

    /// Sets the options of a tier, replacing any previous ones. Options need not be sorted.
    pub fn insert(&mut self, tier: Tier, formats: Vec<ModulationFormat>) {
        self.formats.insert(tier, formats);
    }

    /// Returns the same table with a different fallback.
    pub fn with_fallback(mut self, fallback: FormatFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn fallback(&self) -> FormatFallback {
        self.fallback
    }

    /// Tiers the table knows about, in ascending order.
    pub fn tiers(&self) -> impl Iterator<Item = Tier> + '_ {
        self.formats.keys().copied()
    }

    pub fn formats(&self, tier: Tier) -> Option<&[ModulationFormat]> {
        self.formats.get(&tier).map(|v| v.as_slice())
    }

    /// Slots needed to carry `tier` over `length`: the smallest slot count among all options whose
    /// reach covers `length`. Every option is considered, regardless of order.
    pub fn slots_for(&self, tier: Tier, length: Kilometers) -> Result<usize, ModulationError> {
        let formats = self
            .formats
            .get(&tier)
            .ok_or(ModulationError::UnknownTier(tier))?;
        let best = formats
            .iter()
            .filter(|f| length <= f.max_reach)
            .map(|f| f.slots)
            .min();
        match (best, self.fallback) {
            (Some(slots), _) => Ok(slots),
            (None, FormatFallback::SingleSlot) => {
                log::debug!("No format of tier {tier} reaches {length}, charging 1 slot");
                Ok(1)
            }
            (None, FormatFallback::Reject) => Err(ModulationError::Unreachable { tier, length }),
        }
    }

    /// Slots needed to carry `tier` over `path`.
    pub fn select(&self, path: &Path, tier: Tier) -> Result<usize, ModulationError> {
        self.slots_for(tier, path.length())
    }
}

impl Default for ModulationTable {
    /// The reference table for tiers 100 to 1000 Gbps.
    fn default() -> Self {
        const REFERENCE: [(u32, [(f64, usize); 5]); 10] = [
            (100, [(4500., 6), (3500., 4), (3000., 3), (2500., 2), (1500., 2)]),
            (200, [(2500., 8), (1500., 6), (1000., 5), (700., 4), (500., 3)]),
            (300, [(2000., 10), (1500., 8), (1000., 7), (800., 6), (500., 4)]),
            (400, [(2000., 16), (1000., 12), (800., 8), (600., 6), (200., 5)]),
            (500, [(1500., 20), (800., 16), (600., 12), (500., 8), (200., 7)]),
            (600, [(1000., 28), (700., 22), (500., 20), (400., 16), (200., 10)]),
            (700, [(1000., 32), (600., 26), (400., 24), (300., 20), (200., 14)]),
            (800, [(800., 36), (500., 32), (300., 28), (250., 24), (200., 18)]),
            (900, [(600., 42), (400., 36), (250., 32), (200., 28), (100., 24)]),
            (1000, [(500., 48), (300., 42), (200., 38), (150., 32), (100., 24)]),
        ];
        let mut table = Self::new(FormatFallback::default());
        for (tier, options) in REFERENCE {
            let formats = options
                .into_iter()
                .map(|(reach, slots)| ModulationFormat::new(Kilometers::new(reach), slots))
                .collect();
            table.insert(Tier::new(tier), formats);
        }
        table
    }
}

/// Modulation selection error.
#[derive(Debug, thiserror::Error)]
pub enum ModulationError {
    /// The table has no entry for the tier.
    #[error("no modulation formats for tier {0}")]
    UnknownTier(Tier),

    /// No format of the tier reaches the path length.
    #[error("no modulation format of tier {tier} reaches {length}")]
    Unreachable {
        /// The requested tier.
        tier: Tier,
        /// The path length.
        length: Kilometers,
    },
}
