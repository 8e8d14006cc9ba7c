//! Planning of credential flows for one round: decomposes the client's
//! input and output value vectors into a DAG of registration requests
//! whose edges say which credential is presented where, under the
//! protocol's fan-in/fan-out bound of [`CREDENTIAL_NUMBER`] per request.
//!
//! Resolution is pure and deterministic; identical inputs produce
//! structurally identical graphs. Degree or balance violations inside the
//! algorithm are bugs, not input errors, and panic.

pub mod edge_set;
pub mod node;

use crate::dependency_graph::edge_set::{CredentialDependency, CredentialEdgeSet};
use crate::dependency_graph::node::{CredentialType, NodeId, RequestNode, ValueVector};
use crate::CREDENTIAL_NUMBER;
use log::debug;
use std::cmp::Reverse;
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyGraphError {
    #[error("total input value {inputs} does not cover total output value {outputs} for {credential_type:?} credentials")]
    InsufficientInputValue { credential_type: CredentialType, inputs: u64, outputs: u64 },
}

/// The planning graph. Transformations consume the graph and return the
/// updated value; nothing is ever mutated behind a shared reference.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    vertices: Vec<RequestNode>,
    edge_sets: [CredentialEdgeSet; CredentialType::COUNT],
}

impl DependencyGraph {
    /// Builds and fully resolves the graph for one round.
    pub fn resolve_credential_dependencies(
        input_values: &[ValueVector],
        output_values: &[ValueVector],
    ) -> Result<Self, DependencyGraphError> {
        let mut graph = DependencyGraph::from_values(input_values, output_values)?;
        for credential_type in CredentialType::ALL {
            graph = graph.resolve_negative_balance_nodes(credential_type);
        }
        for credential_type in CredentialType::ALL {
            graph = graph.resolve_zero_credentials(credential_type);
        }
        debug!(
            "resolved graph: {} inputs, {} outputs, {} reissuances",
            graph.inputs().count(),
            graph.outputs().count(),
            graph.reissuances().count()
        );
        Ok(graph)
    }

    /// One Input node per input vector, one Output node per output vector.
    /// The only user-facing precondition: inputs must cover outputs for
    /// every credential type.
    pub fn from_values(
        input_values: &[ValueVector],
        output_values: &[ValueVector],
    ) -> Result<Self, DependencyGraphError> {
        for credential_type in CredentialType::ALL {
            let inputs: u64 = input_values.iter().map(|v| v.value(credential_type)).sum();
            let outputs: u64 = output_values.iter().map(|v| v.value(credential_type)).sum();
            if inputs < outputs {
                return Err(DependencyGraphError::InsufficientInputValue {
                    credential_type,
                    inputs,
                    outputs,
                });
            }
        }

        let mut vertices = Vec::with_capacity(input_values.len() + output_values.len());
        for &values in input_values {
            vertices.push(RequestNode::input(vertices.len(), values));
        }
        for &values in output_values {
            vertices.push(RequestNode::output(vertices.len(), values));
        }
        Ok(DependencyGraph { vertices, edge_sets: Default::default() })
    }

    pub fn vertices(&self) -> &[RequestNode] {
        &self.vertices
    }

    pub fn node(&self, id: NodeId) -> &RequestNode {
        &self.vertices[id]
    }

    pub fn inputs(&self) -> impl Iterator<Item = &RequestNode> {
        self.vertices.iter().filter(|n| n.kind == node::NodeKind::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &RequestNode> {
        self.vertices.iter().filter(|n| n.kind == node::NodeKind::Output)
    }

    pub fn reissuances(&self) -> impl Iterator<Item = &RequestNode> {
        self.vertices.iter().filter(|n| n.kind == node::NodeKind::Reissuance)
    }

    pub fn edges(&self, credential_type: CredentialType) -> &[CredentialDependency] {
        self.edge_sets[credential_type.index()].edges()
    }

    pub fn balance(&self, credential_type: CredentialType, id: NodeId) -> i64 {
        self.node(id).initial_balance(credential_type)
            + self.edge_sets[credential_type.index()].edge_balance(id)
    }

    pub fn in_degree(&self, credential_type: CredentialType, id: NodeId) -> usize {
        self.edge_sets[credential_type.index()].in_degree(id)
    }

    pub fn out_degree(&self, credential_type: CredentialType, id: NodeId) -> usize {
        self.edge_sets[credential_type.index()].out_degree(id)
    }

    fn remaining_in_degree(&self, credential_type: CredentialType, id: NodeId) -> usize {
        self.node(id).max_in_degree() - self.in_degree(credential_type, id)
    }

    fn remaining_out_degree(&self, credential_type: CredentialType, id: NodeId) -> usize {
        self.node(id).max_out_degree() - self.out_degree(credential_type, id)
    }

    fn remaining_zero_out_degree(&self, credential_type: CredentialType, id: NodeId) -> usize {
        self.node(id).max_zero_only_out_degree()
            - self.edge_sets[credential_type.index()].zero_out_degree(id)
    }

    fn push_reissuance(&mut self) -> NodeId {
        let id = self.vertices.len();
        self.vertices.push(RequestNode::reissuance(id));
        id
    }

    /// Defensive invariants; violations are algorithm defects. A node's
    /// final out-edge must discharge its positive balance completely, and
    /// a node's final in-edge must settle its negative balance, so that a
    /// nonzero-balance node always keeps a usable slot.
    fn add_edge(mut self, credential_type: CredentialType, from: NodeId, to: NodeId, value: u64) -> Self {
        assert!(value > 0, "value edges must carry value");
        assert_ne!(from, to, "self-edges are illegal");
        let from_balance = self.balance(credential_type, from);
        let to_balance = self.balance(credential_type, to);
        let out_degree = self.out_degree(credential_type, from);
        let in_degree = self.in_degree(credential_type, to);
        assert!(out_degree < self.node(from).max_out_degree(), "out-degree exhausted");
        assert!(in_degree < self.node(to).max_in_degree(), "in-degree exhausted");
        if out_degree + 1 == self.node(from).max_out_degree() && from_balance > 0 {
            assert_eq!(from_balance, value as i64, "final out-edge leaves value stranded");
        }
        if in_degree + 1 == self.node(to).max_in_degree() && to_balance < 0 {
            assert_eq!(-to_balance, value as i64, "final in-edge leaves a deficit");
        }
        self.edge_sets[credential_type.index()]
            .insert(CredentialDependency { from, to, value });
        self
    }

    fn add_zero_edge(mut self, credential_type: CredentialType, from: NodeId, to: NodeId) -> Self {
        assert_ne!(from, to, "self-edges are illegal");
        assert!(
            self.remaining_zero_out_degree(credential_type, from) > 0,
            "zero-only out-degree exhausted"
        );
        assert!(
            self.in_degree(credential_type, to) < self.node(to).max_in_degree(),
            "in-degree exhausted"
        );
        debug_assert!(self.balance(credential_type, to) >= 0);
        self.edge_sets[credential_type.index()]
            .insert(CredentialDependency { from, to, value: 0 });
        self
    }

    /// Repeats until no node carries a negative balance for this type:
    /// try the uniform-input special case, otherwise discharge the single
    /// largest-magnitude node against its nearest counterparts.
    fn resolve_negative_balance_nodes(mut self, credential_type: CredentialType) -> Self {
        loop {
            self = self.resolve_uniform_inputs(credential_type);
            if !self.vertices.iter().any(|n| self.balance(credential_type, n.id) < 0) {
                return self;
            }
            let largest = self
                .vertices
                .iter()
                .map(|n| n.id)
                .filter(|&id| self.balance(credential_type, id) != 0)
                .max_by_key(|&id| (self.balance(credential_type, id).unsigned_abs(), Reverse(id)))
                .expect("a negative-balance node exists");
            self = if self.balance(credential_type, largest) < 0 {
                self.discharge_negative(credential_type, largest)
            } else {
                self.discharge_positive(credential_type, largest)
            };
        }
    }

    /// Opposite-sign nodes by descending magnitude, taken until their
    /// combined magnitude reaches `need` or they run out.
    fn select_nodes_to_discharge(
        &self,
        credential_type: CredentialType,
        positive: bool,
        need: u64,
    ) -> Vec<NodeId> {
        let mut candidates: Vec<NodeId> = self
            .vertices
            .iter()
            .map(|n| n.id)
            .filter(|&id| {
                let balance = self.balance(credential_type, id);
                if positive {
                    balance > 0
                } else {
                    balance < 0
                }
            })
            .collect();
        candidates
            .sort_by_key(|&id| (Reverse(self.balance(credential_type, id).unsigned_abs()), id));

        let mut selected = Vec::new();
        let mut sum = 0u64;
        for id in candidates {
            if sum >= need {
                break;
            }
            sum += self.balance(credential_type, id).unsigned_abs();
            selected.push(id);
        }
        selected
    }

    fn magnitude_sum(&self, credential_type: CredentialType, nodes: &[NodeId]) -> u64 {
        nodes.iter().map(|&id| self.balance(credential_type, id).unsigned_abs()).sum()
    }

    /// Fan-in: the largest node is negative and gets filled by smaller
    /// positive nodes, through a reissuance tree whenever they cannot
    /// match it exactly within its remaining in-degree.
    fn discharge_negative(mut self, credential_type: CredentialType, largest: NodeId) -> Self {
        let need = self.balance(credential_type, largest).unsigned_abs();
        let counterparts = self.select_nodes_to_discharge(credential_type, true, need);
        let sum = self.magnitude_sum(credential_type, &counterparts);
        debug_assert!(sum >= need, "inputs always cover outputs");

        if let [counterpart] = counterparts[..] {
            let available = self.balance(credential_type, counterpart).unsigned_abs();
            if available == need || self.remaining_out_degree(credential_type, counterpart) > 1 {
                self = self.add_edge(credential_type, counterpart, largest, need);
            } else {
                // The counterpart's last slot must not carry a partial
                // discharge; move its whole balance behind a reissuance.
                let reissuance = self.push_reissuance();
                self = self.add_edge(credential_type, counterpart, reissuance, available);
                self = self.add_edge(credential_type, reissuance, largest, need);
            }
        } else if sum == need
            && counterparts.len() <= self.remaining_in_degree(credential_type, largest)
        {
            for counterpart in counterparts {
                let value = self.balance(credential_type, counterpart).unsigned_abs();
                self = self.add_edge(credential_type, counterpart, largest, value);
            }
        } else {
            let (graph, merged) = self.reduce_nodes(credential_type, counterparts);
            self = graph.add_edge(credential_type, merged, largest, need);
        }
        self
    }

    /// Fan-out: the largest node is positive and drains smaller negative
    /// nodes, mirroring [`DependencyGraph::discharge_negative`].
    fn discharge_positive(mut self, credential_type: CredentialType, largest: NodeId) -> Self {
        let need = self.balance(credential_type, largest).unsigned_abs();
        let counterparts = self.select_nodes_to_discharge(credential_type, false, need);
        let sum = self.magnitude_sum(credential_type, &counterparts);

        if let [counterpart] = counterparts[..] {
            let available = self.balance(credential_type, counterpart).unsigned_abs();
            let value = need.min(available);
            if value == available {
                if value == need || self.remaining_out_degree(credential_type, largest) > 1 {
                    self = self.add_edge(credential_type, largest, counterpart, value);
                } else {
                    let reissuance = self.push_reissuance();
                    self = self.add_edge(credential_type, largest, reissuance, need);
                    self = self.add_edge(credential_type, reissuance, counterpart, value);
                }
            } else if self.remaining_in_degree(credential_type, counterpart) > 1 {
                self = self.add_edge(credential_type, largest, counterpart, value);
            } else {
                let reissuance = self.push_reissuance();
                self = self.add_edge(credential_type, reissuance, counterpart, available);
                self = self.add_edge(credential_type, largest, reissuance, value);
            }
        } else if sum == need
            && counterparts.len() <= self.remaining_out_degree(credential_type, largest)
        {
            for counterpart in counterparts {
                let value = self.balance(credential_type, counterpart).unsigned_abs();
                self = self.add_edge(credential_type, largest, counterpart, value);
            }
        } else {
            let (graph, merged) = self.reduce_nodes(credential_type, counterparts);
            self = graph;
            let value = need.min(sum);
            if value < need && self.remaining_out_degree(credential_type, largest) == 1 {
                let reissuance = self.push_reissuance();
                self = self.add_edge(credential_type, largest, reissuance, need);
                self = self.add_edge(credential_type, reissuance, merged, value);
            } else {
                self = self.add_edge(credential_type, largest, merged, value);
            }
        }
        self
    }

    /// Merges a same-sign node set into a single node by building a
    /// bottom-up tree of reissuance nodes, each hop combining up to
    /// [`CREDENTIAL_NUMBER`] nodes.
    fn reduce_nodes(
        mut self,
        credential_type: CredentialType,
        nodes: Vec<NodeId>,
    ) -> (Self, NodeId) {
        let mut queue: VecDeque<NodeId> = nodes.into();
        while queue.len() > 1 {
            let group: Vec<NodeId> = (0..CREDENTIAL_NUMBER.min(queue.len()))
                .filter_map(|_| queue.pop_front())
                .collect();
            let reissuance = self.push_reissuance();
            for member in group {
                let balance = self.balance(credential_type, member);
                self = if balance > 0 {
                    self.add_edge(credential_type, member, reissuance, balance as u64)
                } else {
                    self.add_edge(credential_type, reissuance, member, balance.unsigned_abs())
                };
            }
            queue.push_back(reissuance);
        }
        let merged = queue.pop_front().expect("reduction always leaves one node");
        (self, merged)
    }

    /// Common-case shortcut for many equal-sized inputs (notably vsize
    /// credentials): when every untouched positive node holds the same
    /// value and each covers any single negative node, wire them directly.
    /// With enough providers this is a plain 1:1 zip; otherwise negative
    /// nodes are dealt round-robin into one bucket per provider. Leaves
    /// the graph untouched when any bucket overflows its provider.
    fn resolve_uniform_inputs(mut self, credential_type: CredentialType) -> Self {
        let providers: Vec<NodeId> = self
            .vertices
            .iter()
            .map(|n| n.id)
            .filter(|&id| {
                self.balance(credential_type, id) > 0 && self.out_degree(credential_type, id) == 0
            })
            .collect();
        let mut consumers: Vec<NodeId> = self
            .vertices
            .iter()
            .map(|n| n.id)
            .filter(|&id| self.balance(credential_type, id) < 0)
            .collect();
        consumers
            .sort_by_key(|&id| (Reverse(self.balance(credential_type, id).unsigned_abs()), id));

        if providers.is_empty() || consumers.is_empty() {
            return self;
        }
        let uniform_value = self.balance(credential_type, providers[0]).unsigned_abs();
        if !providers
            .iter()
            .all(|&id| self.balance(credential_type, id).unsigned_abs() == uniform_value)
        {
            return self;
        }
        if !consumers
            .iter()
            .all(|&id| self.balance(credential_type, id).unsigned_abs() <= uniform_value)
        {
            return self;
        }

        if providers.len() >= consumers.len() {
            for (&provider, &consumer) in providers.iter().zip(&consumers) {
                let value = self.balance(credential_type, consumer).unsigned_abs();
                self = self.add_edge(credential_type, provider, consumer, value);
            }
            return self;
        }

        let mut buckets: Vec<Vec<NodeId>> = vec![Vec::new(); providers.len()];
        for (i, &consumer) in consumers.iter().enumerate() {
            buckets[i % providers.len()].push(consumer);
        }
        if buckets
            .iter()
            .any(|bucket| self.magnitude_sum(credential_type, bucket) > uniform_value)
        {
            return self;
        }

        for (&provider, bucket) in providers.iter().zip(buckets) {
            let sum = self.magnitude_sum(credential_type, &bucket);
            if bucket.len() < CREDENTIAL_NUMBER
                || (bucket.len() == CREDENTIAL_NUMBER && sum == uniform_value)
            {
                for consumer in bucket {
                    let value = self.balance(credential_type, consumer).unsigned_abs();
                    self = self.add_edge(credential_type, provider, consumer, value);
                }
            } else {
                let (graph, merged) = self.reduce_nodes(credential_type, bucket);
                self = graph.add_edge(credential_type, provider, merged, sum);
            }
        }
        self
    }

    /// After the value edges are settled, every non-input node must still
    /// reach its full presentation quota; the missing slots are filled
    /// with zero-valued credentials. Consumers are filled ancestors first
    /// (topological order of the settled edges), so every node upstream of
    /// a consumer is already complete, and therefore usable as a provider,
    /// by the time the consumer asks. Providers must be fully filled and
    /// must not be downstream of their consumer.
    fn resolve_zero_credentials(mut self, credential_type: CredentialType) -> Self {
        let mut rank = vec![0usize; self.vertices.len()];
        for (position, id) in self.topological_order().into_iter().enumerate() {
            rank[id] = position;
        }
        let mut consumers: Vec<NodeId> = self
            .vertices
            .iter()
            .map(|n| n.id)
            .filter(|&id| {
                self.in_degree(credential_type, id) < self.node(id).max_in_degree()
            })
            .collect();
        consumers.sort_by_key(|&id| rank[id]);

        for consumer in consumers {
            while self.in_degree(credential_type, consumer) < self.node(consumer).max_in_degree()
            {
                let provider = self
                    .vertices
                    .iter()
                    .map(|n| n.id)
                    .find(|&id| {
                        id != consumer
                            && self.in_degree(credential_type, id)
                                == self.node(id).max_in_degree()
                            && self.remaining_zero_out_degree(credential_type, id) > 0
                            && !self.reaches(consumer, id)
                    })
                    .expect("zero-credential capacity is reserved for this pass");
                self = self.add_zero_edge(credential_type, provider, consumer);
            }
        }
        self
    }

    /// Topological order over the union of both edge sets. Nodes become
    /// ready in id order, so the result is deterministic.
    fn topological_order(&self) -> Vec<NodeId> {
        let mut pending: Vec<usize> = (0..self.vertices.len())
            .map(|id| self.edge_sets.iter().map(|set| set.in_degree(id)).sum())
            .collect();
        let mut ready: VecDeque<NodeId> =
            (0..self.vertices.len()).filter(|&id| pending[id] == 0).collect();
        let mut order = Vec::with_capacity(self.vertices.len());
        while let Some(node) = ready.pop_front() {
            order.push(node);
            for edge_set in &self.edge_sets {
                for edge in edge_set.out_edges(node) {
                    pending[edge.to] -= 1;
                    if pending[edge.to] == 0 {
                        ready.push_back(edge.to);
                    }
                }
            }
        }
        debug_assert_eq!(order.len(), self.vertices.len(), "dependency edges form a cycle");
        order
    }

    /// Path existence over the union of both edge sets.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut seen = vec![false; self.vertices.len()];
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if std::mem::replace(&mut seen[node], true) {
                continue;
            }
            for edge_set in &self.edge_sets {
                stack.extend(edge_set.out_edges(node).map(|e| e.to));
            }
        }
        false
    }
}
