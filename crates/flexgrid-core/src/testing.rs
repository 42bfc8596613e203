//! Small topologies shared by tests across the workspace.

use crate::network::types::{Link, Node, NodeId};

fn link(a: usize, b: usize, length: f64) -> Link {
    Link::new(NodeId::new(a), NodeId::new(b), length)
}

fn nodes(n: usize) -> Vec<Node> {
    (0..n).map(|i| Node::new(NodeId::new(i))).collect()
}

/// Four nodes on a square with 100 km sides. Nodes 0 and 3 sit on opposite corners and are joined
/// by the link-disjoint paths 0-1-3 and 0-2-3 of equal length.
pub fn square_config() -> (Vec<Node>, Vec<Link>) {
    let links = vec![
        link(0, 1, 100.0),
        link(1, 3, 100.0),
        link(0, 2, 100.0),
        link(2, 3, 100.0),
    ];
    (nodes(4), links)
}

/// The square plus node 4, which has no links.
pub fn disconnected_config() -> (Vec<Node>, Vec<Link>) {
    let (_, links) = square_config();
    (nodes(5), links)
}

/// `n` nodes on a ring, every link `length` km long.
pub fn ring_config(n: usize, length: f64) -> (Vec<Node>, Vec<Link>) {
    let links = (0..n).map(|i| link(i, (i + 1) % n, length)).collect();
    (nodes(n), links)
}

/// A six-node mesh with uneven link lengths:
///
/// ```text
///   0 --800-- 1 --700-- 2
///   |         |         |
///  900       300       600
///   |         |         |
///   3 --500-- 4 --400-- 5
/// ```
pub fn mesh_config() -> (Vec<Node>, Vec<Link>) {
    let links = vec![
        link(0, 1, 800.0),
        link(1, 2, 700.0),
        link(0, 3, 900.0),
        link(1, 4, 300.0),
        link(2, 5, 600.0),
        link(3, 4, 500.0),
        link(4, 5, 400.0),
    ];
    (nodes(6), links)
}

/// Two rails between 0 and 5 joined by two crossing rungs:
///
/// ```text
///   0 --100-- 1 --100-- 4 --100-- 5
///   |          \       /          |
///   |           1000 1000         |
///   |          /       \          |
///   0 --500-- 2 --500-- 3 --500-- 5
/// ```
///
/// Links are 0-1, 1-4, 4-5 on the short rail, 0-2, 2-3, 3-5 on the long one, and the rungs 1-3 and
/// 2-4. An unconstrained maximum flow between 0 and 5 pairs each rail with a rung, so neither of
/// its paths avoids the short rail.
pub fn crossed_ladder_config() -> (Vec<Node>, Vec<Link>) {
    let links = vec![
        link(0, 1, 100.0),
        link(1, 4, 100.0),
        link(4, 5, 100.0),
        link(0, 2, 500.0),
        link(2, 3, 500.0),
        link(3, 5, 500.0),
        link(1, 3, 1000.0),
        link(2, 4, 1000.0),
    ];
    (nodes(6), links)
}
