use std::{cmp::Ordering, collections::BinaryHeap};

use petgraph::{
    graph::NodeIndex,
    visit::{VisitMap, Visitable},
};

use crate::{
    network::topology::Topology,
    units::Kilometers,
};

/// Shortest path from `src` to `dst` by summed link length, as a node index sequence.
///
/// Ties are broken deterministically: the heap pops equal distances in ascending `NodeId`
/// order, neighbors are relaxed in ascending `NodeId` order, and a predecessor is only replaced on
/// a strictly shorter distance.
pub(super) fn shortest_path(
    topology: &Topology,
    src: NodeIndex,
    dst: NodeIndex,
) -> Option<Vec<NodeIndex>> {
    let g = &topology.graph;
    let mut dist: Vec<Option<Kilometers>> = vec![None; g.node_count()];
    let mut prev: Vec<Option<NodeIndex>> = vec![None; g.node_count()];
    let mut visited = g.visit_map();
    let mut visit_next = BinaryHeap::new();
    dist[src.index()] = Some(Kilometers::ZERO);
    visit_next.push(MinScored(Kilometers::ZERO, (g[src].id, src)));

    while let Some(MinScored(score, (_, node))) = visit_next.pop() {
        if !visited.visit(node) {
            continue;
        }
        if node == dst {
            break;
        }
        for &(next, link) in topology.neighbors(node) {
            if visited.is_visited(&next) {
                continue;
            }
            let next_score = score + g[link].length;
            let improves = match dist[next.index()] {
                Some(old) => next_score < old,
                None => true,
            };
            if improves {
                dist[next.index()] = Some(next_score);
                prev[next.index()] = Some(node);
                visit_next.push(MinScored(next_score, (g[next].id, next)));
            }
        }
    }

    dist[dst.index()]?;
    let mut nodes = vec![dst];
    let mut cur = dst;
    while let Some(p) = prev[cur.index()] {
        nodes.push(p);
        cur = p;
    }
    nodes.reverse();
    Some(nodes)
}

/// `MinScored<K, T>` holds a score `K` and a scored object `T` in a pair for use with a
/// `BinaryHeap`. It reverses the order so that the smallest score pops first; equal scores fall
/// back to the smallest `T`.
#[derive(Copy, Clone, Debug)]
struct MinScored<K, T>(K, T);

impl<K: PartialOrd, T: Ord> PartialEq for MinScored<K, T> {
    #[inline]
    fn eq(&self, other: &MinScored<K, T>) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: PartialOrd, T: Ord> Eq for MinScored<K, T> {}

impl<K: PartialOrd, T: Ord> PartialOrd for MinScored<K, T> {
    #[inline]
    fn partial_cmp(&self, other: &MinScored<K, T>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: PartialOrd, T: Ord> Ord for MinScored<K, T> {
    #[inline]
    fn cmp(&self, other: &MinScored<K, T>) -> Ordering {
        // Link lengths are validated to be finite, so scores are always comparable
        match other.0.partial_cmp(&self.0) {
            Some(Ordering::Equal) | None => other.1.cmp(&self.1),
            Some(ord) => ord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_scored_pops_smallest_score_then_smallest_id() {
        let mut heap = BinaryHeap::new();
        heap.push(MinScored(Kilometers::new(2.0), 0));
        heap.push(MinScored(Kilometers::new(1.0), 7));
        heap.push(MinScored(Kilometers::new(1.0), 3));
        let order = std::iter::from_fn(|| heap.pop().map(|MinScored(_, t)| t)).collect::<Vec<_>>();
        assert_eq!(order, vec![3, 7, 0]);
    }
}
