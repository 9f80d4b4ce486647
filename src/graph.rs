//! Stage Graph
//!
//! The runtime effect chain. Stages live in a slotmap arena and each one holds
//! at most one successor link, stored as a key rather than an owning pointer.
//! Links can be rewired freely, including back onto earlier stages; a loop is
//! then just a property of the data, which [`StageGraph::has_feedback`]
//! reports, not a leak.

use crate::detect::{self, Successors};
use crate::stage::{Process, Transform};
use slotmap::{DefaultKey, SlotMap};

/// Unique identifier for a stage in the graph
pub type StageId = DefaultKey;

/// Internal stage representation
struct Stage {
    transform: Transform,
    name: String,
    successor: Option<StageId>,
}

/// Error types for graph operations
#[derive(Debug, Clone, PartialEq)]
pub enum GraphError {
    InvalidStage,
    FeedbackDetected { entry: StageId },
    UnknownStageName(String),
    DuplicateStageName(String),
    MultipleSuccessors(String),
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidStage => write!(f, "Invalid stage"),
            GraphError::FeedbackDetected { entry } => {
                write!(f, "Feedback loop detected, re-entering at stage {:?}", entry)
            }
            GraphError::UnknownStageName(name) => write!(f, "Unknown stage: {}", name),
            GraphError::DuplicateStageName(name) => write!(f, "Duplicate stage name: {}", name),
            GraphError::MultipleSuccessors(name) => {
                write!(f, "Stage {} has more than one successor", name)
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// The effect chain: stages plus their successor links
#[derive(Default)]
pub struct StageGraph {
    stages: SlotMap<StageId, Stage>,
}

impl StageGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unlinked stage to the graph
    pub fn add(&mut self, name: impl Into<String>, transform: Transform) -> StageId {
        let id = self.stages.insert(Stage {
            transform,
            name: name.into(),
            successor: None,
        });

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: {} stage {:?}", transform.kind(), id);

        id
    }

    /// Remove a stage, clearing every link that pointed at it
    pub fn remove(&mut self, id: StageId) -> Result<(), GraphError> {
        if self.stages.remove(id).is_none() {
            return Err(GraphError::InvalidStage);
        }

        for (_, stage) in &mut self.stages {
            if stage.successor == Some(id) {
                stage.successor = None;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_remove: stage {:?}", id);

        Ok(())
    }

    /// Point `from` at `to`, replacing any previous successor.
    ///
    /// Any target is accepted, including `from` itself or a stage earlier in
    /// the chain. Returns the successor that was replaced.
    pub fn link(&mut self, from: StageId, to: StageId) -> Result<Option<StageId>, GraphError> {
        if !self.stages.contains_key(to) {
            return Err(GraphError::InvalidStage);
        }
        let stage = self.stages.get_mut(from).ok_or(GraphError::InvalidStage)?;
        let previous = stage.successor.replace(to);

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_link: {:?} → {:?}", from, to);

        Ok(previous)
    }

    /// Clear the successor of `from`, returning what it pointed at
    pub fn unlink(&mut self, from: StageId) -> Result<Option<StageId>, GraphError> {
        let stage = self.stages.get_mut(from).ok_or(GraphError::InvalidStage)?;
        let previous = stage.successor.take();

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_unlink: {:?}", from);

        Ok(previous)
    }

    /// Link the given stages in order, `ids[0] → ids[1] → …`
    pub fn link_all(&mut self, ids: &[StageId]) -> Result<(), GraphError> {
        for pair in ids.windows(2) {
            self.link(pair[0], pair[1])?;
        }
        Ok(())
    }

    /// Get the successor of a stage
    pub fn successor(&self, id: StageId) -> Option<StageId> {
        self.stages.get(id).and_then(|s| s.successor)
    }

    /// Get a stage's transform
    pub fn transform(&self, id: StageId) -> Option<&Transform> {
        self.stages.get(id).map(|s| &s.transform)
    }

    /// Replace a stage's transform
    pub fn set_transform(&mut self, id: StageId, transform: Transform) -> Result<(), GraphError> {
        let stage = self.stages.get_mut(id).ok_or(GraphError::InvalidStage)?;
        stage.transform = transform;
        Ok(())
    }

    /// Get stage name
    pub fn name(&self, id: StageId) -> Option<&str> {
        self.stages.get(id).map(|s| s.name.as_str())
    }

    /// Look up a stage by name
    pub fn find(&self, name: &str) -> Option<StageId> {
        self.stages
            .iter()
            .find(|(_, s)| s.name == name)
            .map(|(id, _)| id)
    }

    pub fn contains(&self, id: StageId) -> bool {
        self.stages.contains_key(id)
    }

    /// Get number of stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Get number of successor links
    pub fn link_count(&self) -> usize {
        self.stages.values().filter(|s| s.successor.is_some()).count()
    }

    /// Iterate over all stages as `(id, name, transform, successor)`
    pub fn stages(
        &self,
    ) -> impl Iterator<Item = (StageId, &str, &Transform, Option<StageId>)> {
        self.stages
            .iter()
            .map(|(id, s)| (id, s.name.as_str(), &s.transform, s.successor))
    }

    /// Apply one stage's transform to the first `length` samples of `buffer`.
    ///
    /// `length` is clamped to the buffer, and zero is a no-op.
    pub fn process(
        &self,
        id: StageId,
        buffer: &mut [f32],
        length: usize,
    ) -> Result<(), GraphError> {
        let stage = self.stages.get(id).ok_or(GraphError::InvalidStage)?;
        let length = length.min(buffer.len());
        stage.transform.process(&mut buffer[..length]);
        Ok(())
    }

    /// Whether the chain starting at `start` loops back on itself
    pub fn has_feedback(&self, start: Option<StageId>) -> bool {
        let detected = detect::detect_feedback(self, start);

        #[cfg(feature = "tracing")]
        if detected {
            tracing::debug!("graph_feedback: loop reachable from {:?}", start);
        }

        detected
    }

    /// The stage where the feedback loop reachable from `start` closes
    pub fn feedback_entry(&self, start: Option<StageId>) -> Option<StageId> {
        detect::find_feedback_entry(self, start)
    }

    /// Number of stages in the feedback loop reachable from `start`
    pub fn feedback_loop_len(&self, start: Option<StageId>) -> Option<usize> {
        detect::feedback_loop_len(self, start)
    }

    /// The stages visited from `start`, in order.
    ///
    /// Fails with [`GraphError::FeedbackDetected`] if the walk would never end.
    pub fn chain_from(&self, start: StageId) -> Result<Vec<StageId>, GraphError> {
        if !self.stages.contains_key(start) {
            return Err(GraphError::InvalidStage);
        }
        if let Some(entry) = self.feedback_entry(Some(start)) {
            return Err(GraphError::FeedbackDetected { entry });
        }

        let mut order = Vec::new();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            order.push(id);
            cursor = self.successor(id);
        }
        Ok(order)
    }

    /// Run `buffer` through every stage reachable from `start`, in order.
    ///
    /// Cyclic chains are refused before any sample is touched.
    pub fn process_chain(&self, start: StageId, buffer: &mut [f32]) -> Result<(), GraphError> {
        let order = self.chain_from(start)?;

        #[cfg(feature = "tracing")]
        tracing::debug!("graph_process: {} stages", order.len());

        let length = buffer.len();
        for id in order {
            self.process(id, buffer, length)?;
        }
        Ok(())
    }
}

impl Successors for StageGraph {
    type Cursor = StageId;

    fn successor(&self, cursor: &StageId) -> Option<StageId> {
        StageGraph::successor(self, *cursor)
    }

    fn same(a: &StageId, b: &StageId) -> bool {
        a == b
    }
}
