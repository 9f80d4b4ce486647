//! Serialization and Persistence
//!
//! JSON chain definitions for loading and saving effect chains. Stages are
//! referenced by name so definitions stay readable and stable across runs.
//! Loops are legal in a definition; they load as-is and detection reports
//! them afterwards.

use crate::graph::{GraphError, StageGraph, StageId};
use crate::stage::Transform;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Serializable chain definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDef {
    /// Schema version for forward compatibility
    pub version: u32,

    pub name: String,
    pub description: Option<String>,

    /// Stage the chain is entered at
    #[serde(default)]
    pub head: Option<String>,

    pub stages: Vec<StageDef>,

    #[serde(default)]
    pub links: Vec<LinkDef>,
}

/// A named stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    pub name: String,
    pub transform: Transform,
}

/// A successor link between two named stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDef {
    pub from: String,
    pub to: String,
}

impl StageDef {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
        }
    }
}

impl LinkDef {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl ChainDef {
    /// Create a new empty chain definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: 1,
            name: name.into(),
            description: None,
            head: None,
            stages: vec![],
            links: vec![],
        }
    }

    /// Set the description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the head stage
    pub fn with_head(mut self, head: impl Into<String>) -> Self {
        self.head = Some(head.into());
        self
    }

    /// Add a stage
    pub fn with_stage(mut self, name: impl Into<String>, transform: Transform) -> Self {
        self.stages.push(StageDef::new(name, transform));
        self
    }

    /// Add a link
    pub fn with_link(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.links.push(LinkDef::new(from, to));
        self
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build a graph from this definition.
    ///
    /// Returns the graph and the head stage, if one was named. Each stage may
    /// appear at most once as a link source.
    pub fn build(&self) -> Result<(StageGraph, Option<StageId>), GraphError> {
        let mut graph = StageGraph::new();
        let mut ids: HashMap<&str, StageId> = HashMap::new();

        for stage in &self.stages {
            if ids.contains_key(stage.name.as_str()) {
                return Err(GraphError::DuplicateStageName(stage.name.clone()));
            }
            let id = graph.add(stage.name.clone(), stage.transform);
            ids.insert(stage.name.as_str(), id);
        }

        let lookup = |name: &str| {
            ids.get(name)
                .copied()
                .ok_or_else(|| GraphError::UnknownStageName(name.to_string()))
        };

        for link in &self.links {
            let from = lookup(link.from.as_str())?;
            let to = lookup(link.to.as_str())?;
            if graph.successor(from).is_some() {
                return Err(GraphError::MultipleSuccessors(link.from.clone()));
            }
            graph.link(from, to)?;
        }

        let head = self.head.as_deref().map(lookup).transpose()?;
        Ok((graph, head))
    }

    /// Capture an existing graph as a definition.
    ///
    /// Links are keyed by stage name, so every stage must have a distinct
    /// name; otherwise fails with [`GraphError::DuplicateStageName`].
    pub fn from_graph(
        name: impl Into<String>,
        graph: &StageGraph,
        head: Option<StageId>,
    ) -> Result<Self, GraphError> {
        let mut def = Self::new(name);
        let mut seen = HashSet::new();

        for (_, name, transform, _) in graph.stages() {
            if !seen.insert(name) {
                return Err(GraphError::DuplicateStageName(name.to_string()));
            }
            def.stages.push(StageDef::new(name, *transform));
        }

        for (_, name, _, successor) in graph.stages() {
            if let Some(to) = successor.and_then(|id| graph.name(id)) {
                def.links.push(LinkDef::new(name, to));
            }
        }

        def.head = head.and_then(|id| graph.name(id)).map(String::from);
        Ok(def)
    }
}

impl Default for ChainDef {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
