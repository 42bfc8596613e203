//! The optical topology and its spectrum width.

pub(crate) mod topology;
pub mod types;

pub use topology::TopologyError;
pub use types::*;

use itertools::Itertools;

use crate::units::Kilometers;

use self::topology::Topology;

/// A validated topology in which every link carries `nr_slots` spectrum slots.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Topology,
    nr_slots: usize,
}

impl Network {
    /// Creates a network from a list of nodes and links. See [`TopologyError`] for the conditions
    /// under which this fails.
    pub fn new(nodes: &[Node], links: &[Link], nr_slots: usize) -> Result<Self, TopologyError> {
        if nr_slots == 0 {
            return Err(TopologyError::ZeroSlots);
        }
        let topology = Topology::new(nodes, links)?;
        Ok(Self { topology, nr_slots })
    }

    /// Number of spectrum slots on every link.
    pub fn nr_slots(&self) -> usize {
        self.nr_slots
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.topology.idx_of(&node).is_some()
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.topology.graph.edge_weight(id)
    }

    /// Returns the link joining `a` and `b`, in either orientation.
    pub fn link_between(&self, a: NodeId, b: NodeId) -> Option<LinkId> {
        let ia = *self.topology.idx_of(&a)?;
        let ib = *self.topology.idx_of(&b)?;
        self.topology.graph.find_edge(ia, ib)
    }

    /// Links attached to `node`, ordered by the ID of the far end. Empty for an unknown node.
    pub fn incident_links(&self, node: NodeId) -> impl Iterator<Item = LinkId> + '_ {
        self.topology
            .idx_of(&node)
            .into_iter()
            .flat_map(move |&n| self.topology.neighbors(n).iter().map(|&(_, e)| e))
    }

    /// Resolves a node sequence to a [`Path`]. Returns `None` if the sequence has fewer than two
    /// nodes, visits a node twice, or steps between nodes that are not adjacent.
    pub fn path(&self, nodes: &[NodeId]) -> Option<Path> {
        if nodes.len() < 2 {
            return None;
        }
        if !nodes.iter().all_unique() {
            return None;
        }
        let links = nodes
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| self.link_between(a, b))
            .collect::<Option<Vec<_>>>()?;
        let length = links
            .iter()
            .map(|&l| self.topology.graph[l].length)
            .sum::<Kilometers>();
        Some(Path::new(nodes.to_vec(), links, length))
    }

    pub(crate) fn topology(&self) -> &Topology {
        &self.topology
    }

    delegate::delegate! {
        to self.topology.graph {
            #[call(node_weights)]
            pub fn nodes(&self) -> impl Iterator<Item = &Node>;

            #[call(edge_weights)]
            pub fn links(&self) -> impl Iterator<Item = &Link>;

            #[call(edge_indices)]
            pub fn link_ids(&self) -> impl Iterator<Item = LinkId>;

            #[call(node_count)]
            pub fn nr_nodes(&self) -> usize;
        }

        to self.topology {
            #[call(nr_edges)]
            pub fn nr_links(&self) -> usize;
        }
    }
}
