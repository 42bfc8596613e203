//! Dedicated 1+1 protection. Every demand gets a primary and, when one fits, a backup, both
//! holding their own spectrum.

use flexgrid_core::{
    AllocationPlan, AllocationRecord, Assignment, Commitment, Demand, Instance, PolicyError,
    ProtectionPolicy, Spectrum, TransponderModel,
};
use log::debug;

use crate::utils;

/// How primary and backup windows are searched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FitMode {
    /// First-fit the primary, then first-fit each backup candidate independently.
    #[default]
    PerPath,
    /// Search one offset where the primary window is immediately followed by the backup window,
    /// trying backup candidates in order. If no candidate fits, the primary is placed alone.
    BackToBack,
}

/// Dedicated 1+1 protection.
#[derive(Debug, Default, Clone, typed_builder::TypedBuilder)]
pub struct DedicatedProtection {
    #[builder(default)]
    fit_mode: FitMode,
}

impl DedicatedProtection {
    fn protect_one(
        &self,
        instance: &Instance<'_>,
        spectrum: &mut Spectrum,
        demand: &Demand,
    ) -> Result<AllocationRecord, PolicyError> {
        let tier = demand.tier();
        let (primary, backups) = match utils::split_candidates(instance, demand) {
            Some(split) => split,
            None => return Ok(AllocationRecord::blocked(demand.id, tier)),
        };

        if let FitMode::BackToBack = self.fit_mode {
            if let Some(primary_slots) = instance.slots_for(primary, tier)? {
                for backup in backups {
                    let backup_slots = match instance.slots_for(backup, tier)? {
                        Some(slots) => slots,
                        None => continue,
                    };
                    let windows = spectrum.first_fit_back_to_back(
                        primary,
                        primary_slots,
                        backup,
                        backup_slots,
                    )?;
                    if let Some((wp, wb)) = windows {
                        spectrum.occupy(primary, wp)?;
                        spectrum.occupy(backup, wb)?;
                        debug!("Demand {}: primary {primary} at {wp}, backup {backup} at {wb}", demand.id);
                        return Ok(AllocationRecord::new(
                            demand.id,
                            tier,
                            Assignment::new(primary.clone(), primary_slots, Commitment::Exclusive(wp)),
                            Some(Assignment::new(backup.clone(), backup_slots, Commitment::Exclusive(wb))),
                        ));
                    }
                }
            }
        }

        let primary = match utils::place_exclusive(instance, spectrum, primary, tier)? {
            Some(assignment) => assignment,
            None => {
                log::warn!("Demand {}: no spectrum for primary {primary}", demand.id);
                return Ok(AllocationRecord::blocked(demand.id, tier));
            }
        };
        let mut backup = None;
        if let FitMode::PerPath = self.fit_mode {
            for candidate in backups {
                if let Some(assignment) = utils::place_exclusive(instance, spectrum, candidate, tier)? {
                    backup = Some(assignment);
                    break;
                }
            }
        }
        match &backup {
            Some(b) => debug!("Demand {}: primary {}, backup {}", demand.id, primary.path, b.path),
            None => debug!("Demand {}: primary {}, unprotected", demand.id, primary.path),
        }
        Ok(AllocationRecord::new(demand.id, tier, primary, backup))
    }
}

impl ProtectionPolicy for DedicatedProtection {
    fn name(&self) -> &str {
        "dedicated"
    }

    fn transponder_model(&self) -> TransponderModel {
        TransponderModel::PerPath
    }

    fn protect(
        &self,
        instance: &Instance<'_>,
        spectrum: &mut Spectrum,
    ) -> Result<AllocationPlan, PolicyError> {
        let mut plan = AllocationPlan::new(self.name());
        for demand in instance.demands() {
            plan.push(self.protect_one(instance, spectrum, demand)?);
        }
        Ok(plan)
    }
}
