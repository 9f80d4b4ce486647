//! # fxloop: Effect Chains with Feedback Detection
//!
//! `fxloop` models an audio effect chain as a set of stages, each applying a
//! small in-place transform and forwarding to at most one successor. Hosts may
//! rewire successors at will, including back onto earlier stages, and the
//! crate can tell in linear time and constant space whether a chain loops.
//!
//! ## Architecture
//!
//! - **Stages** - The closed set of sample transforms and the [`Process`] capability
//! - **Stage Graph** - Slotmap arena of stages with one optional successor each
//! - **Detection** - Tortoise/hare traversal over anything implementing [`Successors`]
//! - **Shared Chains** - `Rc`-linked stages, where loops leak until broken
//! - **Serialization** - JSON chain definitions (`std` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use fxloop::prelude::*;
//!
//! let mut graph = StageGraph::new();
//!
//! let gate = graph.add("gate", Transform::noise_gate(0.5));
//! let boost = graph.add("boost", Transform::gain_boost(0.2));
//! let comp = graph.add("comp", Transform::compressor(0.1));
//! graph.link_all(&[gate, boost, comp]).unwrap();
//! assert!(!graph.has_feedback(Some(gate)));
//!
//! let mut block = [0.8, 0.1, -0.3];
//! graph.process_chain(gate, &mut block).unwrap();
//!
//! // Patch the compressor back into the boost
//! graph.link(comp, boost).unwrap();
//! assert!(graph.has_feedback(Some(gate)));
//! assert_eq!(graph.feedback_entry(Some(gate)), Some(boost));
//! ```

pub mod detect;
pub mod graph;
#[cfg(feature = "std")]
pub mod serialize;
pub mod shared;
pub mod stage;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::detect::{detect_feedback, feedback_loop_len, find_feedback_entry, Successors};

    pub use crate::graph::{GraphError, StageGraph, StageId};

    pub use crate::shared::{
        break_feedback, detect_shared_feedback, SharedChain, SharedStage, StageRef,
    };

    pub use crate::stage::{Process, Transform};

    #[cfg(feature = "std")]
    pub use crate::serialize::{ChainDef, LinkDef, StageDef};
}

// Re-export key types at crate root for convenience
pub use prelude::*;
