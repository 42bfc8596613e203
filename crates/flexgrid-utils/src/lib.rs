//! Utilities for feeding flexgrid: topology and demand files, plus synthetic traffic.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use flexgrid_core::{Demand, Network, TopologyError};

mod node_link;
mod traffic;

pub use node_link::{parse_node_link, TopologySpec};
pub use traffic::{generate_demands, split_classes, ClassShares, ServiceClasses, TrafficOpts};

/// Reads a [`Network`] with `nr_slots` spectrum slots per link from a node-link JSON file.
pub fn read_network(path: impl AsRef<Path>, nr_slots: usize) -> Result<Network, Error> {
    let spec = read_topology_spec(path)?;
    Ok(Network::new(&spec.nodes, &spec.links, nr_slots)?)
}

/// Reads a [`TopologySpec`] from a node-link JSON file.
pub fn read_topology_spec(path: impl AsRef<Path>) -> Result<TopologySpec, Error> {
    match extension(path.as_ref()) {
        Some("json") => {
            let contents = std::fs::read_to_string(path.as_ref())?;
            parse_node_link(&contents)
        }
        _ => Err(Error::UnknownFileType(path.as_ref().into())),
    }
}

/// Reads [`Demand`]s from a file in JSON or MessagePack format.
pub fn read_demands(path: impl AsRef<Path>) -> Result<Vec<Demand>, Error> {
    let demands: Vec<Demand> = match extension(path.as_ref()) {
        Some("json") => {
            let contents = std::fs::read_to_string(path.as_ref())?;
            serde_json::from_str(&contents)?
        }
        Some("msgpack") => {
            let f = File::open(path)?;
            let reader = BufReader::new(f);
            rmp_serde::decode::from_read(reader)?
        }
        _ => return Err(Error::UnknownFileType(path.as_ref().into())),
    };
    Ok(demands)
}

/// Writes [`Demand`]s to a file in JSON or MessagePack format, chosen by extension.
pub fn write_demands(path: impl AsRef<Path>, demands: &[Demand]) -> Result<(), Error> {
    match extension(path.as_ref()) {
        Some("json") => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, demands)?;
        }
        Some("msgpack") => {
            let mut writer = BufWriter::new(File::create(path)?);
            rmp_serde::encode::write_named(&mut writer, demands)?;
        }
        _ => return Err(Error::UnknownFileType(path.as_ref().into())),
    }
    Ok(())
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Error kinds for input files and traffic generation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown file type.
    #[error("unknown file type: {0}")]
    UnknownFileType(PathBuf),

    /// Error serializing/deserializing JSON.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Error deserializing MsgPack.
    #[error("MsgPack error")]
    MsgPack(#[from] rmp_serde::decode::Error),

    /// Error serializing MsgPack.
    #[error("MsgPack error")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// I/O error.
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// The topology file describes a directed graph.
    #[error("directed topologies are not supported")]
    DirectedGraph,

    /// Two nodes in the topology file share an ID.
    #[error("duplicate node {0} in topology file")]
    DuplicateNode(String),

    /// A link refers to a node the topology file does not declare.
    #[error("link endpoint {0} is not a declared node")]
    UnknownNode(String),

    /// Error constructing a valid topology.
    #[error("invalid topology")]
    Topology(#[from] TopologyError),

    /// The pair deletion probability is outside `[0, 1]`.
    #[error("deletion probability {0} is outside [0, 1]")]
    InvalidDeletion(f64),

    /// Traffic generation needs at least one volume to draw from.
    #[error("no demand volumes to choose from")]
    NoVolumes,

    /// A service-class share is negative or not finite.
    #[error("invalid service-class share {0}")]
    InvalidShare(f64),
}
