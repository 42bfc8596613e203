use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::network::types::{Link, Node, NodeId};

#[derive(Debug, Clone)]
pub(crate) struct Topology {
    pub(crate) graph: UnGraph<Node, Link>,
    pub(crate) id2idx: FxHashMap<NodeId, NodeIndex>,
    // Per-node incident links, sorted by the neighbor's ID
    adjacency: Vec<Vec<(NodeIndex, EdgeIndex)>>,
}

impl Topology {
    /// Creates a network topology from a list of nodes and links. This function returns an error if
    /// the given specification fails to produce a valid topology.
    ///
    /// Correctness properties:
    ///
    /// - Every node must have a unique ID.
    /// - Every link must have distinct endpoints in `nodes`.
    /// - For any two nodes, there must be at most one link between them.
    /// - Every link must have a positive, finite length.
    ///
    /// Isolated nodes are allowed.
    pub(crate) fn new(nodes: &[Node], links: &[Link]) -> Result<Self, TopologyError> {
        let mut g = UnGraph::with_capacity(nodes.len(), links.len());
        let mut id2idx = FxHashMap::default();
        for n in nodes.iter().cloned() {
            let id = n.id;
            let idx = g.add_node(n);
            if id2idx.insert(id, idx).is_some() {
                // CORRECTNESS: Every node must have a unique ID.
                return Err(TopologyError::DuplicateNodeId(id));
            }
        }
        for &link in links {
            let Link { a, b, length } = link;
            // CORRECTNESS: Every link must have distinct endpoints in `nodes`.
            if a == b {
                return Err(TopologyError::NodeAdjacentSelf(a));
            }
            let ia = *id2idx.get(&a).ok_or(TopologyError::UndeclaredNode(a))?;
            let ib = *id2idx.get(&b).ok_or(TopologyError::UndeclaredNode(b))?;
            // CORRECTNESS: For any two nodes, there must be at most one link between them.
            if g.find_edge(ia, ib).is_some() {
                return Err(TopologyError::DuplicateLink { n1: a, n2: b });
            }
            // CORRECTNESS: Every link must have a positive, finite length.
            if !length.is_finite() || length.into_f64() <= 0.0 {
                return Err(TopologyError::InvalidLength { a, b, length: length.into_f64() });
            }
            g.add_edge(ia, ib, link);
        }
        let adjacency = g
            .node_indices()
            .map(|n| {
                let mut neighbors = g
                    .edges(n)
                    .map(|e| {
                        let other = if e.source() == n { e.target() } else { e.source() };
                        (other, e.id())
                    })
                    .collect::<Vec<_>>();
                neighbors.sort_by_key(|&(other, _)| g[other].id);
                neighbors
            })
            .collect();
        Ok(Self {
            graph: g,
            id2idx,
            adjacency,
        })
    }

    pub(crate) fn idx_of(&self, id: &NodeId) -> Option<&NodeIndex> {
        self.id2idx.get(id)
    }

    /// Incident links of `n` in ascending order of the neighbor's ID.
    pub(crate) fn neighbors(&self, n: NodeIndex) -> &[(NodeIndex, EdgeIndex)] {
        &self.adjacency[n.index()]
    }

    pub(crate) fn nr_edges(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Topology construction error.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("Duplicate node ID {0}")]
    DuplicateNodeId(NodeId),

    #[error("Node {0} is connected to itself")]
    NodeAdjacentSelf(NodeId),

    #[error("Node {0} is not declared")]
    UndeclaredNode(NodeId),

    #[error("Duplicate links between {n1} and {n2}")]
    DuplicateLink { n1: NodeId, n2: NodeId },

    #[error("Link between {a} and {b} has invalid length {length}")]
    InvalidLength { a: NodeId, b: NodeId, length: f64 },

    #[error("Spectrum must have at least one slot")]
    ZeroSlots,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(n: usize) -> Vec<Node> {
        (0..n).map(|i| Node::new(NodeId::new(i))).collect()
    }

    #[test]
    fn empty_topology_succeeds() {
        assert!(
            Topology::new(&[], &[]).is_ok(),
            "failed to create empty topology"
        );
    }

    #[test]
    fn isolated_node_succeeds() {
        let nodes = nodes(3);
        let l1 = Link::new(nodes[0].id, nodes[1].id, 100.0);
        let res = Topology::new(&nodes, &[l1]);
        assert!(res.is_ok());
    }

    #[test]
    fn duplicate_node_fails() {
        let mut nodes = nodes(3);
        nodes[1].id = NodeId::new(0); // error
        let l1 = Link::new(nodes[0].id, nodes[2].id, 100.0);
        let res = Topology::new(&nodes, &[l1]);
        assert!(matches!(res, Err(TopologyError::DuplicateNodeId(..))));
    }

    #[test]
    fn node_adjacent_self_fails() {
        let nodes = nodes(3);
        let l1 = Link::new(nodes[0].id, nodes[1].id, 100.0);
        let l2 = Link::new(nodes[2].id, nodes[2].id, 100.0); // error
        let res = Topology::new(&nodes, &[l1, l2]);
        assert!(matches!(res, Err(TopologyError::NodeAdjacentSelf(..))));
    }

    #[test]
    fn undeclared_node_fails() {
        let nodes = nodes(3);
        let l1 = Link::new(nodes[0].id, NodeId::new(3), 100.0); // error
        let res = Topology::new(&nodes, &[l1]);
        assert!(matches!(res, Err(TopologyError::UndeclaredNode(..))));
    }

    #[test]
    fn duplicate_links_fails() {
        let nodes = nodes(3);
        let l1 = Link::new(nodes[0].id, nodes[1].id, 100.0);
        let l2 = Link::new(nodes[1].id, nodes[0].id, 250.0); // error
        let res = Topology::new(&nodes, &[l1, l2]);
        assert!(matches!(res, Err(TopologyError::DuplicateLink { .. })));
    }

    #[test]
    fn nonpositive_length_fails() {
        let nodes = nodes(3);
        let l1 = Link::new(nodes[0].id, nodes[1].id, 0.0); // error
        let res = Topology::new(&nodes, &[l1]);
        assert!(matches!(res, Err(TopologyError::InvalidLength { .. })));
        let l2 = Link::new(nodes[0].id, nodes[1].id, f64::NAN); // error
        let res = Topology::new(&nodes, &[l2]);
        assert!(matches!(res, Err(TopologyError::InvalidLength { .. })));
    }

    #[test]
    fn neighbors_are_sorted_by_id() {
        let nodes = nodes(4);
        let links = [
            Link::new(nodes[0].id, nodes[3].id, 1.0),
            Link::new(nodes[0].id, nodes[1].id, 1.0),
            Link::new(nodes[2].id, nodes[0].id, 1.0),
        ];
        let topo = Topology::new(&nodes, &links).unwrap();
        let hub = *topo.idx_of(&NodeId::new(0)).unwrap();
        let ids = topo
            .neighbors(hub)
            .iter()
            .map(|&(n, _)| topo.graph[n].id.inner())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
