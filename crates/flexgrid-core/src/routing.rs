//! Candidate path generation. For every node pair this computes one primary path and a list of
//! link-disjoint alternates, once per topology.

mod dijkstra;
mod disjoint;

use std::cmp::Ordering;

use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;

use crate::{
    network::{topology::Topology, Network, NodeId, Path},
    units::Kilometers,
    utils,
};

/// For each unordered node pair, the list `[primary, backup_1, ..., backup_k]`.
///
/// Lists are stored once per pair with paths oriented from the smaller to the larger node ID.
/// Lookups accept either orientation. An absent pair and an empty list both mean that no path is
/// available.
#[derive(Debug, Clone, Default)]
pub struct CandidatePaths {
    inner: FxHashMap<(NodeId, NodeId), Vec<Path>>,
}

impl CandidatePaths {
    /// Creates an empty candidate set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes candidates for every pair of nodes in `network`, keeping at most
    /// `max_candidates` backups per pair.
    ///
    /// The primary is the shortest path by length. Backups come from a maximum set of
    /// link-disjoint paths between the pair in the topology without the primary's links, ordered
    /// by `(length, node sequence)`. A path that visits exactly the primary's node set is
    /// discarded.
    pub fn generate(network: &Network, max_candidates: usize) -> Self {
        let topology = network.topology();
        let g = &topology.graph;
        let mut sources = g.node_indices().collect::<Vec<_>>();
        sources.sort_by_key(|&n| g[n].id);

        // Each source is handled independently. Do chunks of these in parallel.
        let entries = utils::par_chunks(&sources, |chunk| {
            let mut entries = Vec::new();
            for &src in chunk {
                for dst in g.node_indices() {
                    if g[src].id >= g[dst].id {
                        continue;
                    }
                    let paths = candidates_between(topology, src, dst, max_candidates);
                    if !paths.is_empty() {
                        entries.push(((g[src].id, g[dst].id), paths));
                    }
                }
            }
            entries
        });
        let inner = entries.collect::<FxHashMap<_, _>>();
        log::info!(
            "Computed candidate paths for {} reachable node pairs",
            inner.len()
        );
        Self { inner }
    }

    /// Sets the candidate list for a pair, replacing any previous list.
    pub fn insert(&mut self, src: NodeId, dst: NodeId, paths: Vec<Path>) {
        self.inner.insert(key(src, dst), paths);
    }

    /// Candidates for a pair, primary first. Empty if the pair is unreachable.
    pub fn get(&self, src: NodeId, dst: NodeId) -> &[Path] {
        self.inner
            .get(&key(src, dst))
            .map(|paths| paths.as_slice())
            .unwrap_or_default()
    }

    pub fn primary(&self, src: NodeId, dst: NodeId) -> Option<&Path> {
        self.get(src, dst).first()
    }

    pub fn backups(&self, src: NodeId, dst: NodeId) -> &[Path] {
        self.get(src, dst).get(1..).unwrap_or_default()
    }

    /// Iterates over `(pair, candidates)` in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&(NodeId, NodeId), &[Path])> {
        self.inner.iter().map(|(k, v)| (k, v.as_slice()))
    }

    delegate::delegate! {
        to self.inner {
            #[call(len)]
            pub fn nr_pairs(&self) -> usize;
        }
    }
}

fn key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn candidates_between(
    topology: &Topology,
    src: NodeIndex,
    dst: NodeIndex,
    max_candidates: usize,
) -> Vec<Path> {
    let primary = match dijkstra::shortest_path(topology, src, dst) {
        Some(nodes) => to_path(topology, &nodes),
        None => return Vec::new(),
    };
    // Alternates never use a primary link, so every path of the maximum set qualifies
    let mut alternates = disjoint::link_disjoint_paths(topology, src, dst, primary.links())
        .into_iter()
        .map(|nodes| to_path(topology, &nodes))
        .collect::<Vec<_>>();
    alternates.sort_by(|x, y| {
        x.length()
            .partial_cmp(&y.length())
            .unwrap_or(Ordering::Equal)
            .then_with(|| x.nodes().cmp(y.nodes()))
    });
    let backups = alternates
        .into_iter()
        .filter(|p| !p.same_nodes(&primary))
        .take(max_candidates);
    std::iter::once(primary.clone()).chain(backups).collect()
}

// CORRECTNESS: `nodes` must be a walk in `topology`.
fn to_path(topology: &Topology, nodes: &[NodeIndex]) -> Path {
    let g = &topology.graph;
    let links = nodes
        .windows(2)
        .map(|w| {
            topology
                .neighbors(w[0])
                .iter()
                .find(|&&(n, _)| n == w[1])
                .map(|&(_, e)| e)
                .expect("consecutive path nodes must be adjacent")
        })
        .collect::<Vec<_>>();
    let length = links.iter().map(|&e| g[e].length).sum::<Kilometers>();
    Path::new(nodes.iter().map(|&n| g[n].id).collect(), links, length)
}
