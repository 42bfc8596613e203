//! 1:1 protection with failure-triggered switchover.
//!
//! Only the primary is reserved. After placing it, the policy checks the spectrum's impairment
//! overlay. If the primary's window is impaired, the first backup candidate whose first-fit window
//! is unimpaired takes over: its window is occupied, the primary's window is released, and the
//! backup is recorded as the new primary. Backups are never reserved ahead of a failure.
//!
//! [`AvailabilityScope`] picks the links a path's availability depends on.

use flexgrid_core::{
    AllocationPlan, AllocationRecord, Assignment, AvailabilityScope, Commitment, Demand, Instance,
    Path, PolicyError, ProtectionPolicy, SlotWindow, Spectrum, TransponderModel,
};
use log::debug;

use crate::utils;

/// 1:1 protection with switchover.
#[derive(Debug, Default, Clone, Copy, typed_builder::TypedBuilder)]
pub struct SwitchoverProtection {
    /// Links checked against the impairment overlay.
    #[builder(default)]
    availability: AvailabilityScope,
}

impl SwitchoverProtection {
    fn is_available(
        &self,
        instance: &Instance<'_>,
        spectrum: &Spectrum,
        path: &Path,
        window: SlotWindow,
    ) -> Result<bool, PolicyError> {
        let network = instance.network();
        Ok(spectrum.is_available(network, path, window, self.availability)?)
    }

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
        let primary = match utils::place_exclusive(instance, spectrum, primary, tier)? {
            Some(assignment) => assignment,
            None => {
                log::warn!("Demand {}: no spectrum for primary {primary}", demand.id);
                return Ok(AllocationRecord::blocked(demand.id, tier));
            }
        };
        let primary_window = match primary.commitment.reserved_window() {
            Some(window) => window,
            None => return Ok(AllocationRecord::new(demand.id, tier, primary, None)),
        };
        if self.is_available(instance, spectrum, &primary.path, primary_window)? {
            return Ok(AllocationRecord::new(demand.id, tier, primary, None));
        }

        debug!("Demand {}: primary {} is impaired", demand.id, primary.path);
        for backup in backups {
            let slots = match instance.slots_for(backup, tier)? {
                Some(slots) => slots,
                None => continue,
            };
            let window = match spectrum.first_fit(backup, slots)? {
                Some(window) => window,
                None => continue,
            };
            if !self.is_available(instance, spectrum, backup, window)? {
                continue;
            }
            spectrum.occupy(backup, window)?;
            spectrum.release(&primary.path, primary_window)?;
            debug!("Demand {}: switched over to {backup} at {window}", demand.id);
            let mut record = AllocationRecord::new(
                demand.id,
                tier,
                Assignment::new(backup.clone(), slots, Commitment::Exclusive(window)),
                None,
            );
            record.failed_over = true;
            return Ok(record);
        }
        debug!("Demand {}: no backup survives, keeping the primary", demand.id);
        Ok(AllocationRecord::new(demand.id, tier, primary, None))
    }
}

impl ProtectionPolicy for SwitchoverProtection {
    fn name(&self) -> &str {
        "switchover"
    }

    fn transponder_model(&self) -> TransponderModel {
        TransponderModel::PerActivePath
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
