//! Shared backup path protection.
//!
//! Demands are routed on their primaries and grouped into shared-risk groups over those
//! primaries. Within each group, the policy looks for one backup path listed by at least two
//! members (exact path equality) and reserves it once, sized for its widest user. Every member
//! that lists the path references the same window. A reservation is keyed by path and persists
//! across groups, so a path shared by several groups is reserved only once.
//!
//! Demands left without a shared backup fall back to their first backup candidate that differs
//! from the primary. [`BackupFallback`] decides whether that backup is reserved.

use flexgrid_core::{
    AllocationPlan, AllocationRecord, Assignment, Commitment, Demand, DemandId, Instance,
    LinkRiskGrouping, Path, PolicyError, ProtectionPolicy, RiskGroupId, RiskGrouping, SlotWindow,
    Spectrum, TransponderModel,
};
use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::utils;

/// What happens to a backup that could not be shared.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BackupFallback {
    /// Record the backup without occupying spectrum. Reported savings then do not reflect a
    /// deployable reservation.
    #[default]
    Unreserved,
    /// Reserve the first fallback candidate that fits, exclusively.
    Reserved,
}

/// Shared backup path protection.
#[derive(Debug, typed_builder::TypedBuilder)]
pub struct SharedBackupProtection {
    /// How demands are grouped by shared risk.
    #[builder(default = Box::new(LinkRiskGrouping) as Box<dyn RiskGrouping>)]
    grouping: Box<dyn RiskGrouping>,
    /// Occupy spectrum for primaries. When unset, primaries are sized and probed only.
    #[builder(default = false)]
    reserve_primaries: bool,
    #[builder(default)]
    fallback: BackupFallback,
}

impl Default for SharedBackupProtection {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SharedBackupProtection {
    fn place_primary(
        &self,
        instance: &Instance<'_>,
        spectrum: &mut Spectrum,
        demand: &Demand,
    ) -> Result<Option<Assignment>, PolicyError> {
        let tier = demand.tier();
        let primary = match utils::split_candidates(instance, demand) {
            Some((primary, _)) => primary,
            None => return Ok(None),
        };
        if self.reserve_primaries {
            return utils::place_exclusive(instance, spectrum, primary, tier);
        }
        let slots = match instance.slots_for(primary, tier)? {
            Some(slots) => slots,
            None => return Ok(None),
        };
        let probe = spectrum.first_fit(primary, slots)?;
        Ok(probe.map(|window| {
            Assignment::new(
                primary.clone(),
                slots,
                Commitment::Unreserved {
                    probe: Some(window),
                },
            )
        }))
    }

    fn place_fallback(
        &self,
        instance: &Instance<'_>,
        spectrum: &mut Spectrum,
        demand: &Demand,
        primary: &Path,
    ) -> Result<Option<Assignment>, PolicyError> {
        let tier = demand.tier();
        let candidates = backups_of(instance, demand).iter().filter(|&b| b != primary);
        for backup in candidates {
            let slots = match instance.slots_for(backup, tier)? {
                Some(slots) => slots,
                None => continue,
            };
            match self.fallback {
                BackupFallback::Unreserved => {
                    let probe = spectrum.first_fit(backup, slots)?;
                    let commitment = Commitment::Unreserved { probe };
                    return Ok(Some(Assignment::new(backup.clone(), slots, commitment)));
                }
                BackupFallback::Reserved => {
                    if let Some(window) = spectrum.reserve(backup, slots)? {
                        let commitment = Commitment::Exclusive(window);
                        return Ok(Some(Assignment::new(backup.clone(), slots, commitment)));
                    }
                }
            }
        }
        Ok(None)
    }
}

impl ProtectionPolicy for SharedBackupProtection {
    fn name(&self) -> &str {
        "shared"
    }

    fn transponder_model(&self) -> TransponderModel {
        TransponderModel::ModulationAware
    }

    fn protect(
        &self,
        instance: &Instance<'_>,
        spectrum: &mut Spectrum,
    ) -> Result<AllocationPlan, PolicyError> {
        let demands = instance.demands();
        let mut primaries = Vec::with_capacity(demands.len());
        for demand in demands {
            primaries.push(self.place_primary(instance, spectrum, demand)?);
        }

        let routed = demands
            .iter()
            .zip(&primaries)
            .filter_map(|(d, p)| p.as_ref().map(|p| (d.id, &p.path)))
            .collect::<Vec<_>>();
        let groups = self.grouping.group(&routed);
        info!(
            "Formed {} risk groups over {} routed demands",
            groups.len(),
            routed.len()
        );

        let position = demands
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id, i))
            .collect::<FxHashMap<DemandId, usize>>();
        let backup_lists = demands
            .iter()
            .map(|d| backups_of(instance, d))
            .collect::<Vec<_>>();
        let mut backups: Vec<Option<Assignment>> = vec![None; demands.len()];
        let mut reservations: FxHashMap<&Path, (RiskGroupId, SlotWindow)> = FxHashMap::default();
        for group in &groups {
            let open = group
                .members()
                .filter_map(|id| position.get(id).copied())
                .filter(|&i| backups[i].is_none())
                .collect::<Vec<_>>();
            let common = match common_backup(&open, &backup_lists) {
                Some(path) => path,
                None => continue,
            };
            let mut users = Vec::new();
            for &i in &open {
                if !backup_lists[i].contains(common) {
                    continue;
                }
                if let Some(slots) = instance.slots_for(common, demands[i].tier())? {
                    users.push((i, slots));
                }
            }
            let width = match users.iter().map(|&(_, slots)| slots).max() {
                Some(width) => width,
                None => continue,
            };
            let (owner, window) = match reservations.get(common) {
                Some(&reservation) => reservation,
                None => match spectrum.reserve(common, width)? {
                    Some(window) => {
                        reservations.insert(common, (group.id(), window));
                        (group.id(), window)
                    }
                    None => {
                        debug!("Group {}: no spectrum for shared backup {common}", group.id());
                        continue;
                    }
                },
            };
            for (i, slots) in users {
                // An earlier, narrower reservation of the same path cannot carry this demand
                if slots > window.width {
                    continue;
                }
                debug!("Demand {}: shares backup {common} at {window}", demands[i].id);
                let commitment = Commitment::Shared {
                    group: owner,
                    window,
                };
                backups[i] = Some(Assignment::new(common.clone(), slots, commitment));
            }
        }

        let mut plan = AllocationPlan::new(self.name());
        for ((demand, primary), backup) in demands.iter().zip(primaries).zip(backups) {
            let tier = demand.tier();
            let primary = match primary {
                Some(primary) => primary,
                None => {
                    plan.push(AllocationRecord::blocked(demand.id, tier));
                    continue;
                }
            };
            let backup = match backup {
                Some(backup) => Some(backup),
                None => self.place_fallback(instance, spectrum, demand, &primary.path)?,
            };
            plan.push(AllocationRecord::new(demand.id, tier, primary, backup));
        }
        Ok(plan)
    }
}

fn backups_of<'a>(instance: &Instance<'a>, demand: &Demand) -> &'a [Path] {
    instance
        .candidates_for(demand)
        .get(1..)
        .unwrap_or_default()
}

/// The first backup path listed by two members of `open`, scanning member pairs in order.
fn common_backup<'a>(open: &[usize], backup_lists: &[&'a [Path]]) -> Option<&'a Path> {
    for (n, &i) in open.iter().enumerate() {
        for &j in &open[n + 1..] {
            for p1 in backup_lists[i] {
                if backup_lists[j].contains(p1) {
                    return Some(p1);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use flexgrid_core::{
        testing, CandidatePaths, ModulationTable, Network, NodeId, NodeRiskGrouping,
    };

    use super::*;

    fn square() -> (Network, CandidatePaths) {
        let (nodes, links) = testing::square_config();
        let network = Network::new(&nodes, &links, 16).unwrap();
        let candidates = CandidatePaths::generate(&network, 10);
        (network, candidates)
    }

    fn demand(id: usize, src: usize, dst: usize, volume: f64) -> Demand {
        Demand::new(DemandId::new(id), NodeId::new(src), NodeId::new(dst), volume)
    }

    #[test]
    fn lone_demand_falls_back_unreserved() {
        let (network, candidates) = square();
        let modulation = ModulationTable::default();
        let demands = [demand(0, 0, 3, 100.0)];
        let instance = Instance::new(&network, &candidates, &modulation, &demands);
        let mut spectrum = Spectrum::new(&network);
        let plan = SharedBackupProtection::default()
            .protect(&instance, &mut spectrum)
            .unwrap();
        let backup = plan.records()[0].backup.as_ref().unwrap();
        assert_eq!(
            backup.commitment,
            Commitment::Unreserved {
                probe: Some(SlotWindow::new(0, 2))
            }
        );
        assert_eq!(spectrum.occupied_slots(), 0);
    }

    #[test]
    fn reserved_fallback_occupies_spectrum() {
        let (network, candidates) = square();
        let modulation = ModulationTable::default();
        let demands = [demand(0, 0, 3, 100.0)];
        let instance = Instance::new(&network, &candidates, &modulation, &demands);
        let mut spectrum = Spectrum::new(&network);
        let policy = SharedBackupProtection::builder()
            .reserve_primaries(true)
            .fallback(BackupFallback::Reserved)
            .build();
        let plan = policy.protect(&instance, &mut spectrum).unwrap();
        let record = &plan.records()[0];
        assert!(record.primary.as_ref().unwrap().commitment.is_reserved());
        assert!(record.backup.as_ref().unwrap().commitment.is_reserved());
        assert_eq!(spectrum.occupied_slots(), 8);
    }

    #[test]
    fn shared_window_is_sized_for_the_widest_user() {
        let (network, candidates) = square();
        let modulation = ModulationTable::default();
        // 100 Gbps needs 2 slots over 200 km, 400 Gbps needs 5
        let demands = [demand(0, 0, 3, 100.0), demand(1, 3, 0, 400.0)];
        let instance = Instance::new(&network, &candidates, &modulation, &demands);
        let mut spectrum = Spectrum::new(&network);
        let plan = SharedBackupProtection::default()
            .protect(&instance, &mut spectrum)
            .unwrap();
        let windows = plan
            .records()
            .iter()
            .map(|r| r.backup.as_ref().unwrap().commitment.reserved_window())
            .collect::<Vec<_>>();
        assert_eq!(windows, vec![Some(SlotWindow::new(0, 5)); 2]);
        let slots = plan
            .records()
            .iter()
            .map(|r| r.backup.as_ref().unwrap().slots)
            .collect::<Vec<_>>();
        assert_eq!(slots, vec![2, 5]);
        // One 5-slot window on the two links of 0-2-3
        assert_eq!(spectrum.occupied_slots(), 10);
    }

    #[test]
    fn node_grouping_is_pluggable() {
        let (network, candidates) = square();
        let modulation = ModulationTable::default();
        let demands = [demand(0, 0, 3, 100.0), demand(1, 0, 3, 100.0)];
        let instance = Instance::new(&network, &candidates, &modulation, &demands);
        let mut spectrum = Spectrum::new(&network);
        let policy = SharedBackupProtection::builder()
            .grouping(Box::new(NodeRiskGrouping))
            .build();
        let plan = policy.protect(&instance, &mut spectrum).unwrap();
        assert!(plan
            .records()
            .iter()
            .all(|r| matches!(r.backup.as_ref().unwrap().commitment, Commitment::Shared { .. })));
        assert_eq!(spectrum.occupied_slots(), 4);
    }
}
