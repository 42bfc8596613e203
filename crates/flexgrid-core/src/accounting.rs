//! Post-hoc cost of an allocation: occupied spectrum and transponders.

use crate::{protection::AllocationPlan, spectrum::Spectrum};

/// How transponders are counted for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransponderModel {
    /// One transponder per assigned path, primary and backup alike.
    PerPath,
    /// One transponder per demand with an active path.
    PerActivePath,
    /// `ceil(max(primary_slots, backup_slots) / 2)` per demand: two slots of a chosen format map
    /// to one physical transponder, shared between the primary and the backup.
    ModulationAware,
}

/// Total occupied slots over all links.
pub fn occupied_slots(spectrum: &Spectrum) -> usize {
    spectrum.occupied_slots()
}

/// Transponders needed by `plan` under `model`. Blocked demands cost nothing.
pub fn transponder_count(plan: &AllocationPlan, model: TransponderModel) -> usize {
    plan.records()
        .iter()
        .map(|r| match model {
            TransponderModel::PerPath => r.assignments().count(),
            TransponderModel::PerActivePath => usize::from(r.primary.is_some()),
            TransponderModel::ModulationAware => {
                let widest = r.assignments().map(|a| a.slots).max().unwrap_or(0);
                (widest + 1) / 2
            }
        })
        .sum()
}

/// Fraction of `baseline` saved by `other`. `None` if the baseline is zero.
pub fn relative_savings(baseline: usize, other: usize) -> Option<f64> {
    (baseline != 0).then(|| 1.0 - other as f64 / baseline as f64)
}

/// The cost summary of one policy run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Report {
    pub policy: String,
    pub nr_demands: usize,
    pub occupied_slots: usize,
    pub transponders: usize,
    pub unprotected: usize,
    pub blocked: usize,
}

impl Report {
    pub fn new(plan: &AllocationPlan, spectrum: &Spectrum, model: TransponderModel) -> Self {
        Self {
            policy: plan.policy().to_owned(),
            nr_demands: plan.nr_records(),
            occupied_slots: occupied_slots(spectrum),
            transponders: transponder_count(plan, model),
            unprotected: plan.nr_unprotected(),
            blocked: plan.nr_blocked(),
        }
    }

    /// Savings of `self` relative to `baseline`, as `(slots, transponders)`.
    pub fn savings_over(&self, baseline: &Report) -> (Option<f64>, Option<f64>) {
        (
            relative_savings(baseline.occupied_slots, self.occupied_slots),
            relative_savings(baseline.transponders, self.transponders),
        )
    }
}
