use petgraph::graph::EdgeIndex;

use crate::units::Kilometers;

identifier!(NodeId, usize);

/// Links are identified by their position in the topology's link list.
pub type LinkId = EdgeIndex;

/// An optical node (a ROADM site).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Human-readable name carried over from the topology source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Node {
    pub fn new(id: NodeId) -> Self {
        Self { id, label: None }
    }

    pub fn labeled(id: NodeId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: Some(label.into()),
        }
    }
}

/// An undirected fiber link.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    pub a: NodeId,
    pub b: NodeId,
    pub length: Kilometers,
}

impl Link {
    pub fn new(a: NodeId, b: NodeId, length: impl Into<Kilometers>) -> Self {
        Self {
            a,
            b,
            length: length.into(),
        }
    }

    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        self.a == x && self.b == y || self.a == y && self.b == x
    }

    /// Returns the endpoint opposite `n`, if `n` is an endpoint.
    pub fn other(&self, n: NodeId) -> Option<NodeId> {
        if n == self.a {
            Some(self.b)
        } else if n == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// A simple path through the topology.
///
/// Two paths are equal when they visit the same nodes in the same order.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Path {
    nodes: Vec<NodeId>,
    #[serde(skip)]
    links: Vec<LinkId>,
    length: Kilometers,
}

impl Path {
    pub(crate) fn new(nodes: Vec<NodeId>, links: Vec<LinkId>, length: Kilometers) -> Self {
        debug_assert_eq!(nodes.len(), links.len() + 1);
        Self {
            nodes,
            links,
            length,
        }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    /// Total physical length of the path.
    pub fn length(&self) -> Kilometers {
        self.length
    }

    pub fn src(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn dst(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn nr_hops(&self) -> usize {
        self.links.len()
    }

    pub fn contains_link(&self, link: LinkId) -> bool {
        self.links.contains(&link)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns true if `self` and `other` share no link.
    pub fn is_link_disjoint(&self, other: &Path) -> bool {
        self.links.iter().all(|l| !other.contains_link(*l))
    }

    /// Returns true if `self` and `other` visit exactly the same set of nodes, in any order.
    pub fn same_nodes(&self, other: &Path) -> bool {
        let mut mine = self.nodes.clone();
        let mut theirs = other.nodes.clone();
        mine.sort();
        mine.dedup();
        theirs.sort();
        theirs.dedup();
        mine == theirs
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for Path {}

impl std::hash::Hash for Path {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.nodes.hash(state);
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for n in &self.nodes {
            if !first {
                write!(f, "-")?;
            }
            write!(f, "{n}")?;
            first = false;
        }
        Ok(())
    }
}
