use crate::dependency_graph::node::NodeId;
use std::collections::BTreeMap;

/// One edge: `from` will present a credential worth `value` at the
/// request that also produces `to`. Zero-valued edges only appear in the
/// final zero-credential filling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CredentialDependency {
    pub from: NodeId,
    pub to: NodeId,
    pub value: u64,
}

/// Per-credential-type edge index: adjacency in both directions plus the
/// running signed value contribution per node. Iteration order is fixed
/// by the maps, which keeps resolution deterministic.
#[derive(Debug, Clone, Default)]
pub struct CredentialEdgeSet {
    edges: Vec<CredentialDependency>,
    predecessors: BTreeMap<NodeId, Vec<usize>>,
    successors: BTreeMap<NodeId, Vec<usize>>,
    edge_balances: BTreeMap<NodeId, i64>,
}

impl CredentialEdgeSet {
    pub fn insert(&mut self, dependency: CredentialDependency) {
        let index = self.edges.len();
        self.edges.push(dependency);
        self.successors.entry(dependency.from).or_default().push(index);
        self.predecessors.entry(dependency.to).or_default().push(index);
        *self.edge_balances.entry(dependency.from).or_default() -= dependency.value as i64;
        *self.edge_balances.entry(dependency.to).or_default() += dependency.value as i64;
    }

    pub fn edges(&self) -> &[CredentialDependency] {
        &self.edges
    }

    /// Signed contribution of this type's edges to a node's balance.
    pub fn edge_balance(&self, node: NodeId) -> i64 {
        self.edge_balances.get(&node).copied().unwrap_or(0)
    }

    /// In-edges count toward the presentation quota whether or not they
    /// carry value.
    pub fn in_degree(&self, node: NodeId) -> usize {
        self.predecessors.get(&node).map_or(0, Vec::len)
    }

    /// Out-degree of value-bearing edges only; zero edges draw on the
    /// separate zero-only capacity.
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node).filter(|e| e.value > 0).count()
    }

    pub fn zero_out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node).filter(|e| e.value == 0).count()
    }

    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = CredentialDependency> + '_ {
        self.predecessors.get(&node).into_iter().flatten().map(|&i| self.edges[i])
    }

    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = CredentialDependency> + '_ {
        self.successors.get(&node).into_iter().flatten().map(|&i| self.edges[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balances_and_degrees_track_insertions() {
        let mut edge_set = CredentialEdgeSet::default();
        edge_set.insert(CredentialDependency { from: 0, to: 2, value: 5 });
        edge_set.insert(CredentialDependency { from: 1, to: 2, value: 3 });
        edge_set.insert(CredentialDependency { from: 0, to: 2, value: 0 });

        assert_eq!(edge_set.edge_balance(0), -5);
        assert_eq!(edge_set.edge_balance(1), -3);
        assert_eq!(edge_set.edge_balance(2), 8);
        assert_eq!(edge_set.in_degree(2), 3);
        assert_eq!(edge_set.out_degree(0), 1);
        assert_eq!(edge_set.zero_out_degree(0), 1);
        assert_eq!(edge_set.out_degree(1), 1);
    }
}
