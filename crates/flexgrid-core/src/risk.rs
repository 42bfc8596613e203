//! This module defines shared-risk groups: sets of demands that a single failure can hit at
//! once.

use std::collections::BTreeMap;

use crate::{
    demand::DemandId,
    network::{LinkId, NodeId, Path},
};

identifier!(RiskGroupId, usize);

/// The network element whose failure a group shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum RiskElement {
    Link(#[serde(serialize_with = "serialize_link")] LinkId),
    Node(NodeId),
}

fn serialize_link<S: serde::Serializer>(link: &LinkId, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(link.index() as u64)
}

/// Demands whose paths traverse a common element.
#[derive(Debug, Clone, serde::Serialize, derive_new::new)]
pub struct RiskGroup {
    id: RiskGroupId,
    element: RiskElement,
    members: Vec<DemandId>,
}

impl RiskGroup {
    pub fn id(&self) -> RiskGroupId {
        self.id
    }

    pub fn element(&self) -> RiskElement {
        self.element
    }

    delegate::delegate! {
        to self.members {
            /// Returns true if the group contains `demand`.
            pub fn contains(&self, demand: &DemandId) -> bool;

            /// Returns an iterator over the group's members, in the order they joined.
            #[call(iter)]
            pub fn members(&self) -> impl Iterator<Item = &DemandId>;

            #[call(len)]
            pub fn nr_members(&self) -> usize;
        }
    }
}

/// The trait that must be implemented by all risk grouping strategies.
pub trait RiskGrouping: std::fmt::Debug {
    /// Groups demands by the paths they are routed on. Groups are returned in a deterministic
    /// order with sequential IDs starting at zero, and members keep the order of `paths`.
    fn group(&self, paths: &[(DemandId, &Path)]) -> Vec<RiskGroup>;
}

impl<G: RiskGrouping + ?Sized> RiskGrouping for &G {
    fn group(&self, paths: &[(DemandId, &Path)]) -> Vec<RiskGroup> {
        (**self).group(paths)
    }
}

/// One group per link, in link order.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkRiskGrouping;

impl RiskGrouping for LinkRiskGrouping {
    fn group(&self, paths: &[(DemandId, &Path)]) -> Vec<RiskGroup> {
        collect(paths, |p| p.links().iter().map(|&l| RiskElement::Link(l)).collect())
    }
}

/// One group per node, in node ID order. Endpoints count.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeRiskGrouping;

impl RiskGrouping for NodeRiskGrouping {
    fn group(&self, paths: &[(DemandId, &Path)]) -> Vec<RiskGroup> {
        collect(paths, |p| p.nodes().iter().map(|&n| RiskElement::Node(n)).collect())
    }
}

fn collect(
    paths: &[(DemandId, &Path)],
    elements: impl Fn(&Path) -> Vec<RiskElement>,
) -> Vec<RiskGroup> {
    let mut by_element: BTreeMap<RiskElement, Vec<DemandId>> = BTreeMap::new();
    for &(demand, path) in paths {
        for element in elements(path) {
            let members = by_element.entry(element).or_default();
            // Paths are simple, but the same demand may be listed twice
            if !members.contains(&demand) {
                members.push(demand);
            }
        }
    }
    by_element
        .into_iter()
        .enumerate()
        .map(|(i, (element, members))| RiskGroup::new(RiskGroupId::new(i), element, members))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;
    use crate::testing;

    fn setup() -> (Network, Vec<Path>) {
        let (nodes, links) = testing::square_config();
        let network = Network::new(&nodes, &links, 8).unwrap();
        let ids = |v: &[usize]| v.iter().map(|&i| NodeId::new(i)).collect::<Vec<_>>();
        let paths = vec![
            network.path(&ids(&[0, 1, 3])).unwrap(),
            network.path(&ids(&[1, 3])).unwrap(),
            network.path(&ids(&[0, 2])).unwrap(),
        ];
        (network, paths)
    }

    fn summary(groups: &[RiskGroup]) -> Vec<(usize, Vec<usize>)> {
        groups
            .iter()
            .map(|g| (g.id().inner(), g.members().map(|d| d.inner()).collect()))
            .collect()
    }

    #[test]
    fn link_groups_follow_link_order() {
        let (_, paths) = setup();
        let input = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (DemandId::new(i), p))
            .collect::<Vec<_>>();
        let groups = LinkRiskGrouping.group(&input);
        // Links: 0-1 (0), 1-3 (1), 0-2 (2)
        assert_eq!(
            summary(&groups),
            vec![(0, vec![0]), (1, vec![0, 1]), (2, vec![2])]
        );
        assert!(matches!(groups[1].element(), RiskElement::Link(l) if l.index() == 1));
    }

    #[test]
    fn node_groups_include_endpoints() {
        let (_, paths) = setup();
        let input = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (DemandId::new(i), p))
            .collect::<Vec<_>>();
        let groups = NodeRiskGrouping.group(&input);
        assert_eq!(
            summary(&groups),
            vec![(0, vec![0, 2]), (1, vec![0, 1]), (2, vec![2]), (3, vec![0, 1])]
        );
        assert_eq!(groups[0].element(), RiskElement::Node(NodeId::new(0)));
    }

    #[test]
    fn repeated_demands_join_once() {
        let (_, paths) = setup();
        let input = [(DemandId::new(4), &paths[1]), (DemandId::new(4), &paths[1])];
        let groups = LinkRiskGrouping.group(&input);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].nr_members(), 1);
        assert!(groups[0].contains(&DemandId::new(4)));
    }
}
