use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;
use flexgrid::{
    core::{
        provision_on, relative_savings, AvailabilityScope, CandidatePaths, Demand, Instance,
        ModulationTable, Network, ProtectionPolicy, Report, Spectrum,
    },
    impls::{DedicatedProtection, SharedBackupProtection, SwitchoverProtection},
    utils::{generate_demands, read_network, split_classes, ClassShares, TrafficOpts},
};
use rand::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Topology in node-link JSON format
    #[arg(short, long, default_value = "demos/sweep/data/it10.json")]
    topology: PathBuf,

    /// Spectrum slots per link
    #[arg(long, default_value_t = 400)]
    nr_slots: usize,

    /// Backup candidates kept per node pair
    #[arg(short = 'k', long, default_value_t = 10)]
    max_candidates: usize,

    /// First random seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of traffic instances, one per seed
    #[arg(short = 'n', long, default_value_t = 10)]
    repetitions: u64,

    /// Probability that a node pair carries no demand
    #[arg(long, default_value_t = 0.2)]
    deletion: f64,

    /// Links failed before the switchover run
    #[arg(long, default_value_t = 0)]
    failures: usize,

    /// Treat links attached to a path's nodes as part of its availability
    #[arg(long)]
    adjacent_links: bool,

    /// Write per-seed reports to this JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
struct SeedReport {
    seed: u64,
    nr_demands: usize,
    dedicated: Report,
    switchover: Report,
    shared: Report,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let network = read_network(&args.topology, args.nr_slots)?;
    let candidates = CandidatePaths::generate(&network, args.max_candidates);
    let modulation = ModulationTable::default();
    let traffic = TrafficOpts::builder().deletion(args.deletion).build();
    let availability = if args.adjacent_links {
        AvailabilityScope::AdjacentLinks
    } else {
        AvailabilityScope::PathLinks
    };
    let switchover_policy = SwitchoverProtection::builder()
        .availability(availability)
        .build();
    log::info!(
        "Loaded {} nodes, {} links, {} node pairs with candidates",
        network.nr_nodes(),
        network.nr_links(),
        candidates.nr_pairs()
    );

    let mut reports = Vec::new();
    for seed in args.seed..args.seed + args.repetitions {
        let mut rng = StdRng::seed_from_u64(seed);
        let demands = generate_demands(&network, &traffic, &mut rng)?;
        let classes = split_classes(&demands, ClassShares::default())?;
        let failed = failed_spectrum(&network, args.failures, &mut rng)?;

        let evaluate = |demands: &[Demand], policy: &dyn ProtectionPolicy, spectrum: Spectrum| {
            let instance = Instance::new(&network, &candidates, &modulation, demands);
            provision_on(&instance, policy, spectrum).map(|outcome| outcome.report)
        };
        let dedicated = evaluate(
            &classes.dedicated,
            &DedicatedProtection::default(),
            Spectrum::new(&network),
        )?;
        let switchover = evaluate(&classes.switchover, &switchover_policy, failed)?;
        let shared = evaluate(
            &classes.shared,
            &SharedBackupProtection::default(),
            Spectrum::new(&network),
        )?;

        println!("seed {seed}: {} demands", demands.len());
        for report in [&dedicated, &switchover, &shared] {
            println!(
                "  {:<10} {:>6} slots {:>5} transponders {:>4} unprotected {:>4} blocked",
                report.policy,
                report.occupied_slots,
                report.transponders,
                report.unprotected,
                report.blocked
            );
        }
        for report in [&switchover, &shared] {
            println!(
                "  {} vs dedicated: spectrum saving {}, transponder saving {}",
                report.policy,
                fmt_ratio(relative_savings(dedicated.occupied_slots, report.occupied_slots)),
                fmt_ratio(relative_savings(dedicated.transponders, report.transponders)),
            );
        }

        reports.push(SeedReport {
            seed,
            nr_demands: demands.len(),
            dedicated,
            switchover,
            shared,
        });
    }

    if let Some(path) = args.output {
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(writer, &reports)?;
        log::info!("Wrote {} reports to {}", reports.len(), path.display());
    }
    Ok(())
}

/// A fresh spectrum with `count` distinct links failed, chosen at random.
fn failed_spectrum(
    network: &Network,
    count: usize,
    rng: &mut impl Rng,
) -> anyhow::Result<Spectrum> {
    let mut spectrum = Spectrum::new(network);
    let links = network.link_ids().collect::<Vec<_>>();
    for &link in links.choose_multiple(rng, count) {
        log::debug!("Failing link {}", link.index());
        spectrum.fail_link(link)?;
    }
    Ok(spectrum)
}

fn fmt_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(ratio) => format!("{:.3}", ratio),
        None => "n/a".to_string(),
    }
}
