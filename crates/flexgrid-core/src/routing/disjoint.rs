use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use petgraph::{
    graph::{EdgeIndex, NodeIndex},
    visit::{VisitMap, Visitable},
};

use crate::network::topology::Topology;

/// A maximum set of mutually link-disjoint paths from `src` to `dst` that avoid every link in
/// `excluded`.
///
/// Every other link has unit capacity in both directions. Augmenting paths are found with BFS, visiting
/// neighbors in ascending `NodeId` order, and the final flow is decomposed into simple paths by
/// always following the smallest-ID neighbor that carries flow.
pub(super) fn link_disjoint_paths(
    topology: &Topology,
    src: NodeIndex,
    dst: NodeIndex,
    excluded: &[EdgeIndex],
) -> Vec<Vec<NodeIndex>> {
    let g = &topology.graph;
    // Net flow per link, positive in the direction from `Link::a` to `Link::b`
    let mut flow = vec![0i8; g.edge_count()];
    let mut removed = FixedBitSet::with_capacity(g.edge_count());
    for e in excluded {
        removed.insert(e.index());
    }

    loop {
        let mut pred: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; g.node_count()];
        let mut discovered = g.visit_map();
        discovered.visit(src);
        let mut queue = VecDeque::new();
        queue.push_back(src);
        while let Some(u) = queue.pop_front() {
            if u == dst {
                break;
            }
            for &(v, e) in topology.neighbors(u) {
                if discovered.is_visited(&v)
                    || removed.contains(e.index())
                    || outflow(topology, &flow, u, e) >= 1
                {
                    continue;
                }
                discovered.visit(v);
                pred[v.index()] = Some((u, e));
                queue.push_back(v);
            }
        }
        if !discovered.is_visited(&dst) {
            break;
        }
        let mut v = dst;
        while let Some((u, e)) = pred[v.index()] {
            push_unit(topology, &mut flow, u, e);
            v = u;
        }
    }

    let mut paths = Vec::new();
    loop {
        let mut walk = vec![src];
        let mut cur = src;
        while cur != dst {
            let next = topology
                .neighbors(cur)
                .iter()
                .find(|&&(_, e)| outflow(topology, &flow, cur, e) == 1)
                .copied();
            let (v, e) = match next {
                Some(hop) => hop,
                None => break,
            };
            flow[e.index()] = 0;
            // Drop any cycle the walk just closed
            match walk.iter().position(|&n| n == v) {
                Some(pos) => walk.truncate(pos + 1),
                None => walk.push(v),
            }
            cur = v;
        }
        if cur != dst {
            break;
        }
        paths.push(walk);
    }
    paths
}

fn outflow(topology: &Topology, flow: &[i8], from: NodeIndex, link: EdgeIndex) -> i8 {
    let f = flow[link.index()];
    if topology.graph[from].id == topology.graph[link].a {
        f
    } else {
        -f
    }
}

fn push_unit(topology: &Topology, flow: &mut [i8], from: NodeIndex, link: EdgeIndex) {
    if topology.graph[from].id == topology.graph[link].a {
        flow[link.index()] += 1;
    } else {
        flow[link.index()] -= 1;
    }
}
