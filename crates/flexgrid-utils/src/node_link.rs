//! Node-link JSON, the layout graph libraries use to dump a graph with its attributes.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use flexgrid_core::{Link, Node, NodeId};

use crate::Error;

/// A topology specification.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TopologySpec {
    /// Nodes.
    pub nodes: Vec<Node>,
    /// Links.
    pub links: Vec<Link>,
}

/// Parses a node-link document into a [`TopologySpec`].
///
/// Integer node IDs are kept as they are. If any node has a string ID, nodes are numbered in
/// file order instead and the string becomes the node's label unless the node also carries a
/// `name` or `label`. Links may be listed under `links` or `edges`.
pub fn parse_node_link(contents: &str) -> Result<TopologySpec, Error> {
    let doc: NodeLinkDoc = serde_json::from_str(contents)?;
    if doc.directed {
        return Err(Error::DirectedGraph);
    }

    let numeric = doc.nodes.iter().all(|n| matches!(n.id, RawId::Int(_)));
    let mut ids = HashMap::with_capacity(doc.nodes.len());
    let mut nodes = Vec::with_capacity(doc.nodes.len());
    for (i, raw) in doc.nodes.into_iter().enumerate() {
        let id = match (&raw.id, numeric) {
            (&RawId::Int(n), true) => NodeId::new(n),
            _ => NodeId::new(i),
        };
        match ids.entry(raw.id.clone()) {
            Entry::Occupied(_) => return Err(Error::DuplicateNode(raw.id.to_string())),
            Entry::Vacant(e) => e.insert(id),
        };
        let label = match (raw.name, raw.id) {
            (Some(name), _) => Some(name),
            (None, RawId::Str(s)) => Some(s),
            (None, RawId::Int(_)) => None,
        };
        nodes.push(Node { id, label });
    }

    let resolve = |raw: &RawId| {
        ids.get(raw)
            .copied()
            .ok_or_else(|| Error::UnknownNode(raw.to_string()))
    };
    let links = doc
        .links
        .iter()
        .map(|l| Ok(Link::new(resolve(&l.source)?, resolve(&l.target)?, l.length)))
        .collect::<Result<Vec<_>, Error>>()?;
    Ok(TopologySpec { nodes, links })
}

#[derive(Debug, serde::Deserialize)]
struct NodeLinkDoc {
    #[serde(default)]
    directed: bool,
    nodes: Vec<RawNode>,
    #[serde(alias = "edges")]
    links: Vec<RawLink>,
}

#[derive(Debug, serde::Deserialize)]
struct RawNode {
    id: RawId,
    #[serde(default, alias = "label")]
    name: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct RawLink {
    source: RawId,
    target: RawId,
    length: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(usize),
    Str(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Int(n) => write!(f, "{n}"),
            RawId::Str(s) => write!(f, "{s:?}"),
        }
    }
}
