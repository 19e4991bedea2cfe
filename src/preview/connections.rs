use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use tracing::{debug, trace, warn};

use crate::config::ConditionWiring;
use crate::model::{Gateway, ProcessDesign};

/// An element of the generated process, identified the way the markup names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRef {
    Start,
    Task(usize),
    /// Index into the design's gateway list, not the sorted insertion order.
    Gateway(usize),
    End,
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::Task(i) => write!(f, "task_{i}"),
            Self::Gateway(i) => write!(f, "gateway_{i}"),
            Self::End => f.write_str("end"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: NodeRef,
    pub target: NodeRef,
    pub label: Option<String>,
    /// Condition expression, when the connection is a gateway branch.
    pub expression: Option<String>,
}

impl Connection {
    fn plain(source: NodeRef, target: NodeRef) -> Self {
        Self {
            source,
            target,
            label: None,
            expression: None,
        }
    }
}

/// Ordered edges of a preview, in emission order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionPlan {
    connections: Vec<Connection>,
}

impl ConnectionPlan {
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Sequence-flow id of the connection at `position`.
    ///
    /// The first connection is `flow_start`, the last `flow_end`, and the
    /// ones in between count up from `flow_0`.
    pub fn flow_id(&self, position: usize) -> String {
        if position == 0 {
            "flow_start".to_string()
        } else if position + 1 == self.connections.len() {
            "flow_end".to_string()
        } else {
            format!("flow_{}", position - 1)
        }
    }

    pub fn iter_with_ids(&self) -> impl Iterator<Item = (String, &Connection)> {
        self.connections
            .iter()
            .enumerate()
            .map(|(i, c)| (self.flow_id(i), c))
    }

    pub fn graph(&self) -> DiGraph<NodeRef, Option<String>> {
        let mut graph = DiGraph::new();
        let mut index: HashMap<NodeRef, NodeIndex> = HashMap::new();
        for c in &self.connections {
            let source = *index
                .entry(c.source)
                .or_insert_with(|| graph.add_node(c.source));
            let target = *index
                .entry(c.target)
                .or_insert_with(|| graph.add_node(c.target));
            graph.add_edge(source, target, c.label.clone());
        }
        graph
    }

    /// Elements of `design` that no path from the start marker reaches.
    pub fn unreachable(&self, design: &ProcessDesign) -> Vec<NodeRef> {
        let graph = self.graph();
        let mut reached = Vec::new();
        if let Some(start) = graph.node_indices().find(|i| graph[*i] == NodeRef::Start) {
            let mut dfs = Dfs::new(&graph, start);
            while let Some(ix) = dfs.next(&graph) {
                reached.push(graph[ix]);
            }
        }

        std::iter::once(NodeRef::Start)
            .chain((0..design.step_count()).map(NodeRef::Task))
            .chain((0..design.gateways().len()).map(NodeRef::Gateway))
            .chain(std::iter::once(NodeRef::End))
            .filter(|node| !reached.contains(node))
            .collect()
    }
}

/// Decide which element connects to which.
///
/// Steps form the main chain. A gateway anchored after step `k` is spliced in
/// before step `k + 1`: the current element feeds the gateway, the gateway
/// fans out to its condition targets, and the walk resumes at step `k + 1`.
/// Gateways anchored after the last step (or past it) are chained right
/// before the end marker.
pub fn resolve(design: &ProcessDesign, wiring: ConditionWiring) -> ConnectionPlan {
    let steps = design.step_count();
    let gateways = design.gateways();
    let mut connections = Vec::with_capacity(steps + 1 + gateways.len() * 3);

    if gateways.is_empty() {
        let mut current = NodeRef::Start;
        for i in 0..steps {
            connections.push(Connection::plain(current, NodeRef::Task(i)));
            current = NodeRef::Task(i);
        }
        connections.push(Connection::plain(current, NodeRef::End));
        return ConnectionPlan { connections };
    }

    let mut order: Vec<usize> = (0..gateways.len()).collect();
    order.sort_by_key(|&g| gateways[g].after_step_index);
    let mut pending = order.into_iter().peekable();

    let mut current = NodeRef::Start;
    for i in 0..steps {
        let mut spliced = false;
        while let Some(g) = pending.next_if(|&g| gateways[g].after_step_index < i) {
            connections.push(Connection::plain(current, NodeRef::Gateway(g)));
            branch(&mut connections, g, &gateways[g], steps, wiring);
            current = NodeRef::Task(i);
            spliced = true;
        }
        if !spliced {
            connections.push(Connection::plain(current, NodeRef::Task(i)));
            current = NodeRef::Task(i);
        }
    }

    for g in pending {
        trace!(gateway = g, "gateway placed after the last step");
        connections.push(Connection::plain(current, NodeRef::Gateway(g)));
        branch(&mut connections, g, &gateways[g], steps, wiring);
        current = NodeRef::Gateway(g);
    }
    connections.push(Connection::plain(current, NodeRef::End));

    let plan = ConnectionPlan { connections };
    let unreachable = plan.unreachable(design);
    if !unreachable.is_empty() {
        debug!(?unreachable, "preview contains elements not reachable from start");
    }
    plan
}

fn branch(
    connections: &mut Vec<Connection>,
    index: usize,
    gateway: &Gateway,
    steps: usize,
    wiring: ConditionWiring,
) {
    for (position, condition) in gateway.conditions.iter().enumerate().take(wiring.limit()) {
        if condition.target_step_index >= steps {
            warn!(
                gateway = index,
                condition = position,
                target = condition.target_step_index,
                steps,
                "skipping condition that targets a missing step"
            );
            continue;
        }
        connections.push(Connection {
            source: NodeRef::Gateway(index),
            target: NodeRef::Task(condition.target_step_index),
            label: Some(condition.label.clone()),
            expression: Some(condition.expression.clone()).filter(|e| !e.trim().is_empty()),
        });
    }
}
