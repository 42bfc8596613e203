use flexgrid_core::{
    Assignment, Commitment, Demand, Instance, Path, PolicyError, Spectrum, Tier,
};

/// Reserves the first-fit window for `path` and returns it as an exclusive assignment. `None` if
/// the path is out of reach or no window is free.
pub(crate) fn place_exclusive(
    instance: &Instance<'_>,
    spectrum: &mut Spectrum,
    path: &Path,
    tier: Tier,
) -> Result<Option<Assignment>, PolicyError> {
    let slots = match instance.slots_for(path, tier)? {
        Some(slots) => slots,
        None => return Ok(None),
    };
    let assignment = spectrum
        .reserve(path, slots)?
        .map(|window| Assignment::new(path.clone(), slots, Commitment::Exclusive(window)));
    Ok(assignment)
}

/// Splits the candidates of `demand` into primary and backups, logging demands with none.
pub(crate) fn split_candidates<'a>(
    instance: &Instance<'a>,
    demand: &Demand,
) -> Option<(&'a Path, &'a [Path])> {
    let split = instance.candidates_for(demand).split_first();
    if split.is_none() {
        log::warn!(
            "Demand {} between {} and {} has no candidate paths",
            demand.id,
            demand.src,
            demand.dst
        );
    }
    split
}
