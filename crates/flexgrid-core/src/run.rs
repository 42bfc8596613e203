use crate::{
    accounting::Report,
    demand,
    protection::{AllocationPlan, Instance, PolicyError, ProtectionPolicy},
    routing::CandidatePaths,
    spec::{Spec, SpecError},
    spectrum::Spectrum,
};

/// The result of running a policy on one traffic instance.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// Per-demand allocation records.
    pub plan: AllocationPlan,
    /// The spectrum after allocation.
    pub spectrum: Spectrum,
    /// Cost summary of `plan`.
    pub report: Report,
}

/// The core routine. This validates a specification, computes candidate paths, and runs
/// `policy` on a cleared spectrum.
///
/// This function returns an error if the specification is invalid or the policy violates a
/// spectrum contract.
pub fn run<P>(spec: Spec, policy: P) -> Result<Outcome, Error>
where
    P: ProtectionPolicy,
{
    let spec = spec.validate()?;
    let candidates = CandidatePaths::generate(&spec.network, spec.max_candidates);
    let instance = Instance::new(
        &spec.network,
        &candidates,
        &spec.modulation,
        &spec.demands,
    );
    let outcome = provision(&instance, policy)?;
    Ok(outcome)
}

/// Runs `policy` on `instance` starting from an all-free, unimpaired spectrum. Candidate paths in
/// `instance` can be reused across calls.
pub fn provision<P>(instance: &Instance<'_>, policy: P) -> Result<Outcome, PolicyError>
where
    P: ProtectionPolicy,
{
    provision_on(instance, policy, Spectrum::new(instance.network()))
}

/// Runs `policy` on `instance` using `spectrum`. Occupancy is cleared first and impairments are
/// kept, so failures can be staged before allocation.
pub fn provision_on<P>(
    instance: &Instance<'_>,
    policy: P,
    mut spectrum: Spectrum,
) -> Result<Outcome, PolicyError>
where
    P: ProtectionPolicy,
{
    demand::validate(instance.network(), instance.demands())?;
    spectrum.clear();
    let plan = policy.protect(instance, &mut spectrum)?;
    let report = Report::new(&plan, &spectrum, policy.transponder_model());
    log::info!(
        "{}: {} demands, {} slots occupied, {} transponders, {} unprotected, {} blocked",
        report.policy,
        report.nr_demands,
        report.occupied_slots,
        report.transponders,
        report.unprotected,
        report.blocked,
    );
    Ok(Outcome {
        plan,
        spectrum,
        report,
    })
}

/// Run error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The specification is invalid.
    #[error(transparent)]
    InvalidSpec(#[from] SpecError),

    /// The policy failed.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}
