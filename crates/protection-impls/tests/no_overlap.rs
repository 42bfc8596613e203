use std::collections::HashSet;

use flexgrid_core::{
    provision, testing, AllocationPlan, AvailabilityScope, CandidatePaths, Commitment, Demand,
    DemandId, Instance, LinkId, ModulationTable, Network, NodeId, Path, ProtectionPolicy,
    SlotWindow, Spectrum,
};
use proptest::prelude::*;
use protection_impls::{
    BackupFallback, DedicatedProtection, FitMode, SharedBackupProtection, SwitchoverProtection,
};

// Every distinct reservation in a plan, with shared windows counted once.
fn reservations(plan: &AllocationPlan) -> Vec<(Path, SlotWindow)> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for record in plan.records() {
        for assignment in record.assignments() {
            match assignment.commitment {
                Commitment::Exclusive(window) => out.push((assignment.path.clone(), window)),
                Commitment::Shared { window, .. } => {
                    if seen.insert((assignment.path.clone(), window)) {
                        out.push((assignment.path.clone(), window));
                    }
                }
                Commitment::Unreserved { .. } => {}
            }
        }
    }
    out
}

fn check_plan(plan: &AllocationPlan, spectrum: &Spectrum) -> Result<(), TestCaseError> {
    let reserved = reservations(plan);
    let mut by_link: Vec<(LinkId, SlotWindow)> = Vec::new();
    for (path, window) in &reserved {
        for &link in path.links() {
            by_link.push((link, *window));
        }
    }
    for (i, &(l1, w1)) in by_link.iter().enumerate() {
        for &(l2, w2) in &by_link[i + 1..] {
            if l1 == l2 {
                prop_assert!(
                    w1.end() <= w2.start || w2.end() <= w1.start,
                    "windows {} and {} overlap on link {}",
                    w1,
                    w2,
                    l1.index()
                );
            }
        }
    }
    let expected = by_link.iter().map(|(_, w)| w.width).sum::<usize>();
    prop_assert_eq!(spectrum.occupied_slots(), expected);
    Ok(())
}

fn demands() -> impl Strategy<Value = Vec<Demand>> {
    prop::collection::vec((0usize..6, 1usize..6, 0.0f64..1000.0), 1..30).prop_map(|v| {
        v.into_iter()
            .enumerate()
            .map(|(i, (src, offset, volume))| {
                let dst = (src + offset) % 6;
                Demand::new(DemandId::new(i), NodeId::new(src), NodeId::new(dst), volume)
            })
            .collect()
    })
}

fn policies() -> Vec<Box<dyn ProtectionPolicy>> {
    vec![
        Box::new(DedicatedProtection::default()),
        Box::new(
            DedicatedProtection::builder()
                .fit_mode(FitMode::BackToBack)
                .build(),
        ),
        Box::new(SwitchoverProtection::default()),
        Box::new(
            SwitchoverProtection::builder()
                .availability(AvailabilityScope::AdjacentLinks)
                .build(),
        ),
        Box::new(SharedBackupProtection::default()),
        Box::new(
            SharedBackupProtection::builder()
                .reserve_primaries(true)
                .fallback(BackupFallback::Reserved)
                .build(),
        ),
    ]
}

proptest! {
    #[test]
    fn reservations_never_overlap(
        demands in demands(),
        nr_slots in 4usize..64,
        topology in 0usize..3,
    ) {
        let (nodes, links) = match topology {
            0 => testing::mesh_config(),
            1 => testing::crossed_ladder_config(),
            _ => testing::ring_config(6, 400.0),
        };
        let network = Network::new(&nodes, &links, nr_slots).unwrap();
        let candidates = CandidatePaths::generate(&network, 10);
        let modulation = ModulationTable::default();
        let instance = Instance::new(&network, &candidates, &modulation, &demands);
        for policy in policies() {
            let outcome = provision(&instance, policy.as_ref()).unwrap();
            prop_assert_eq!(outcome.plan.nr_records(), demands.len());
            check_plan(&outcome.plan, &outcome.spectrum)?;
        }
    }

    #[test]
    fn switchover_matches_active_footprint_under_failures(
        demands in demands(),
        failed in 0usize..6,
    ) {
        let (nodes, links) = testing::ring_config(6, 400.0);
        let network = Network::new(&nodes, &links, 400).unwrap();
        let candidates = CandidatePaths::generate(&network, 10);
        let modulation = ModulationTable::default();
        let instance = Instance::new(&network, &candidates, &modulation, &demands);
        let mut spectrum = Spectrum::new(&network);
        spectrum.fail_link(LinkId::new(failed)).unwrap();
        let outcome =
            flexgrid_core::provision_on(&instance, SwitchoverProtection::default(), spectrum)
                .unwrap();
        for record in outcome.plan.records() {
            prop_assert!(record.backup.is_none());
        }
        check_plan(&outcome.plan, &outcome.spectrum)?;
    }
}
