//! Capability graph - declarative construction of delegating agents.
//!
//! Nodes are agents, edges are "may delegate to". The graph must be acyclic:
//! [`AgentGraph::build`] rejects cycles (including self-delegation) before any
//! agent is constructed, then builds agents leaves first so every delegate
//! exists before the agents that call it.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::domain::foundation::AgentId;
use crate::ports::ReasoningBackend;

use super::{Agent, AgentConfigBuilder, AgentTool, GraphError};

struct AgentNode {
    id: AgentId,
    config: AgentConfigBuilder,
    backend: Arc<dyn ReasoningBackend>,
    delegates: Vec<Delegate>,
}

struct Delegate {
    target: AgentId,
    error_label: Option<String>,
}

/// Agents by name, as produced by [`AgentGraph::build`].
#[derive(Debug, Clone, Default)]
pub struct AgentSet {
    agents: HashMap<AgentId, Arc<Agent>>,
}

impl AgentSet {
    pub fn get(&self, name: &str) -> Option<Arc<Agent>> {
        self.agents
            .iter()
            .find(|(id, _)| id.as_str() == name)
            .map(|(_, agent)| agent.clone())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Declarative agent graph.
#[derive(Default)]
pub struct AgentGraph {
    nodes: Vec<AgentNode>,
}

impl AgentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an agent.
    pub fn agent(
        mut self,
        id: AgentId,
        config: AgentConfigBuilder,
        backend: Arc<dyn ReasoningBackend>,
    ) -> Result<Self, GraphError> {
        if self.nodes.iter().any(|node| node.id == id) {
            return Err(GraphError::DuplicateAgent(id.to_string()));
        }
        self.nodes.push(AgentNode {
            id,
            config,
            backend,
            delegates: Vec::new(),
        });
        Ok(self)
    }

    /// Lets `from` call `to` as a tool.
    pub fn delegate(self, from: &AgentId, to: &AgentId) -> Result<Self, GraphError> {
        self.add_delegate(from, to, None)
    }

    /// Like [`AgentGraph::delegate`], with a prefix for failure messages.
    pub fn delegate_labeled(
        self,
        from: &AgentId,
        to: &AgentId,
        error_label: impl Into<String>,
    ) -> Result<Self, GraphError> {
        self.add_delegate(from, to, Some(error_label.into()))
    }

    fn add_delegate(
        mut self,
        from: &AgentId,
        to: &AgentId,
        error_label: Option<String>,
    ) -> Result<Self, GraphError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|node| &node.id == from)
            .ok_or_else(|| GraphError::UnknownAgent {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        node.delegates.push(Delegate {
            target: to.clone(),
            error_label,
        });
        Ok(self)
    }

    /// Checks the graph and builds every agent.
    pub fn build(self) -> Result<AgentSet, GraphError> {
        let edges = self.edges()?;
        if let Some(path) = find_cycle(&self.nodes, &edges) {
            return Err(GraphError::CycleInAgentGraph { path });
        }
        let order = build_order(&self.nodes, &edges);

        let mut pending: HashMap<AgentId, AgentNode> = self
            .nodes
            .into_iter()
            .map(|node| (node.id.clone(), node))
            .collect();
        let mut built = AgentSet::default();

        for id in order {
            let Some(node) = pending.remove(&id) else {
                continue;
            };
            let mut config = node.config;
            for delegate in node.delegates {
                let target = built.agents.get(&delegate.target).cloned().ok_or_else(|| {
                    GraphError::UnknownAgent {
                        from: id.to_string(),
                        to: delegate.target.to_string(),
                    }
                })?;
                let mut tool = AgentTool::new(target);
                if let Some(label) = delegate.error_label {
                    tool = tool.with_error_label(label);
                }
                let spec = tool.spec().map_err(|err| GraphError::Agent {
                    agent: id.to_string(),
                    source: err.into(),
                })?;
                config = config.tool(spec, Arc::new(tool));
            }

            let config = config.build().map_err(|source| GraphError::Agent {
                agent: id.to_string(),
                source,
            })?;
            tracing::debug!(agent = %id, "Built agent");
            built
                .agents
                .insert(id.clone(), Arc::new(Agent::new(id, config, node.backend)));
        }
        Ok(built)
    }

    fn edges(&self) -> Result<HashMap<AgentId, Vec<AgentId>>, GraphError> {
        let known: HashSet<&AgentId> = self.nodes.iter().map(|node| &node.id).collect();
        let mut edges = HashMap::new();
        for node in &self.nodes {
            let mut targets = Vec::with_capacity(node.delegates.len());
            for delegate in &node.delegates {
                if !known.contains(&delegate.target) {
                    return Err(GraphError::UnknownAgent {
                        from: node.id.to_string(),
                        to: delegate.target.to_string(),
                    });
                }
                targets.push(delegate.target.clone());
            }
            edges.insert(node.id.clone(), targets);
        }
        Ok(edges)
    }
}

/// Depth-first search for a cycle; returns it as a closed path.
fn find_cycle(nodes: &[AgentNode], edges: &HashMap<AgentId, Vec<AgentId>>) -> Option<Vec<String>> {
    let mut done = HashSet::new();
    for node in nodes {
        let mut stack = Vec::new();
        if let Some(path) = cycle_dfs(&node.id, edges, &mut stack, &mut done) {
            return Some(path);
        }
    }
    None
}

fn cycle_dfs(
    current: &AgentId,
    edges: &HashMap<AgentId, Vec<AgentId>>,
    stack: &mut Vec<AgentId>,
    done: &mut HashSet<AgentId>,
) -> Option<Vec<String>> {
    if let Some(start) = stack.iter().position(|id| id == current) {
        let mut path: Vec<String> = stack[start..].iter().map(AgentId::to_string).collect();
        path.push(current.to_string());
        return Some(path);
    }
    if done.contains(current) {
        return None;
    }

    stack.push(current.clone());
    if let Some(targets) = edges.get(current) {
        for target in targets {
            if let Some(path) = cycle_dfs(target, edges, stack, done) {
                return Some(path);
            }
        }
    }
    stack.pop();
    done.insert(current.clone());
    None
}

/// Kahn's algorithm over "depends on" edges: delegates come before callers.
fn build_order(nodes: &[AgentNode], edges: &HashMap<AgentId, Vec<AgentId>>) -> Vec<AgentId> {
    let mut remaining: HashMap<&AgentId, usize> = nodes
        .iter()
        .map(|node| (&node.id, edges.get(&node.id).map_or(0, Vec::len)))
        .collect();

    let mut queue: VecDeque<&AgentId> = nodes
        .iter()
        .map(|node| &node.id)
        .filter(|id| remaining.get(id) == Some(&0))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(id) = queue.pop_front() {
        order.push(id.clone());
        for node in nodes {
            let depends = edges
                .get(&node.id)
                .map_or(0, |targets| targets.iter().filter(|t| *t == id).count());
            if depends == 0 {
                continue;
            }
            if let Some(count) = remaining.get_mut(&node.id) {
                *count -= depends;
                if *count == 0 {
                    queue.push_back(&node.id);
                }
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentConfig;
    use crate::domain::metrics::TokenUsage;
    use crate::ports::{BackendError, BackendInfo, BackendRequest, BackendResponse};
    use async_trait::async_trait;

    struct FixedBackend;

    #[async_trait]
    impl ReasoningBackend for FixedBackend {
        async fn respond(&self, _request: BackendRequest) -> Result<BackendResponse, BackendError> {
            Ok(BackendResponse::final_text("ok", TokenUsage::zero()))
        }

        fn backend_info(&self) -> BackendInfo {
            BackendInfo::new("fixed", "fixed-1")
        }
    }

    fn id(name: &str) -> AgentId {
        AgentId::new(name).unwrap()
    }

    fn graph(names: &[&str]) -> AgentGraph {
        let backend: Arc<dyn ReasoningBackend> = Arc::new(FixedBackend);
        names.iter().fold(AgentGraph::new(), |graph, name| {
            graph
                .agent(id(name), AgentConfig::builder(format!("You are {}", name)), backend.clone())
                .unwrap()
        })
    }

    #[test]
    fn build_wires_delegates_as_tools() {
        let agents = graph(&["coordinator", "fundamental", "risk"])
            .delegate(&id("coordinator"), &id("fundamental"))
            .unwrap()
            .delegate(&id("coordinator"), &id("risk"))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(agents.len(), 3);
        let coordinator = agents.get("coordinator").unwrap();
        assert_eq!(
            coordinator.config().registry().tool_names(),
            &["fundamental".to_string(), "risk".to_string()]
        );
        assert!(agents.get("risk").unwrap().config().registry().is_empty());
    }

    #[test]
    fn build_rejects_cycles() {
        let err = graph(&["a", "b", "c"])
            .delegate(&id("a"), &id("b"))
            .unwrap()
            .delegate(&id("b"), &id("c"))
            .unwrap()
            .delegate(&id("c"), &id("a"))
            .unwrap()
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            GraphError::CycleInAgentGraph {
                path: vec!["a".into(), "b".into(), "c".into(), "a".into()]
            }
        );
    }

    #[test]
    fn build_rejects_self_delegation() {
        let err = graph(&["solo"])
            .delegate(&id("solo"), &id("solo"))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::CycleInAgentGraph { .. }));
    }

    #[test]
    fn build_rejects_unknown_delegate() {
        let err = graph(&["a"])
            .delegate(&id("a"), &id("ghost"))
            .unwrap()
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownAgent {
                from: "a".into(),
                to: "ghost".into()
            }
        );
    }

    #[test]
    fn duplicate_agents_are_rejected() {
        let backend: Arc<dyn ReasoningBackend> = Arc::new(FixedBackend);
        let err = graph(&["a"])
            .agent(id("a"), AgentConfig::builder("again"), backend)
            .err()
            .unwrap();
        assert_eq!(err, GraphError::DuplicateAgent("a".into()));
    }

    #[test]
    fn diamond_graph_shares_the_leaf() {
        let agents = graph(&["top", "left", "right", "leaf"])
            .delegate(&id("top"), &id("left"))
            .unwrap()
            .delegate(&id("top"), &id("right"))
            .unwrap()
            .delegate(&id("left"), &id("leaf"))
            .unwrap()
            .delegate(&id("right"), &id("leaf"))
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(agents.len(), 4);
        assert!(agents.get("left").unwrap().config().registry().has_tool("leaf"));
        assert!(agents.get("right").unwrap().config().registry().has_tool("leaf"));
    }

    #[test]
    fn invalid_agent_config_is_reported() {
        let backend: Arc<dyn ReasoningBackend> = Arc::new(FixedBackend);
        let err = AgentGraph::new()
            .agent(id("blank"), AgentConfig::builder(""), backend)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::Agent { .. }));
    }
}
