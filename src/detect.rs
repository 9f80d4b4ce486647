//! Feedback Loop Detection
//!
//! Constant-space cycle detection over any structure where each node has at
//! most one successor. The detector walks two cursors down the chain, one a
//! single link per step and one two links per step (Floyd's tortoise and
//! hare). If the chain terminates the fast cursor runs off the end; if it
//! loops the fast cursor laps the slow one and they land on the same node.
//!
//! The traversal only reads links through [`Successors`], so the same code
//! serves the slotmap-backed [`StageGraph`](crate::graph::StageGraph), the
//! `Rc`-linked [`SharedChain`](crate::shared::SharedChain), and plain index
//! tables (`[Option<usize>]`).
//!
//! ```rust
//! use fxloop::detect::{detect_feedback, find_feedback_entry};
//!
//! // 0 -> 1 -> 2 -> 3 -> 1
//! let links = [Some(1), Some(2), Some(3), Some(1)];
//! assert!(detect_feedback(&links[..], Some(0)));
//! assert_eq!(find_feedback_entry(&links[..], Some(0)), Some(1));
//!
//! // 0 -> 1 -> 2
//! let links = [Some(1), Some(2), None];
//! assert!(!detect_feedback(&links[..], Some(0)));
//! ```

/// Out-degree ≤ 1 link structure the detector can traverse.
pub trait Successors {
    /// Handle to one node. Cloning must be cheap.
    type Cursor: Clone;

    /// The node `cursor` links to, if any
    fn successor(&self, cursor: &Self::Cursor) -> Option<Self::Cursor>;

    /// Identity comparison: true when both cursors name the same node,
    /// regardless of what the nodes contain
    fn same(a: &Self::Cursor, b: &Self::Cursor) -> bool;
}

/// Index tables: entry `i` holds the index node `i` links to.
///
/// Out-of-range indices are treated as absent links.
impl Successors for [Option<usize>] {
    type Cursor = usize;

    fn successor(&self, cursor: &usize) -> Option<usize> {
        self.get(*cursor).copied().flatten()
    }

    fn same(a: &usize, b: &usize) -> bool {
        a == b
    }
}

/// Returns true if following successor links from `start` ever revisits a
/// node. An absent start is vacuously acyclic.
///
/// Runs in O(n) link reads and O(1) extra memory, and never mutates the
/// chain.
pub fn detect_feedback<S>(chain: &S, start: Option<S::Cursor>) -> bool
where
    S: Successors + ?Sized,
{
    meeting_point(chain, start).is_some()
}

/// Returns the first node on the path from `start` that lies on the loop,
/// i.e. the node the feedback link points back to. `None` when acyclic.
pub fn find_feedback_entry<S>(chain: &S, start: Option<S::Cursor>) -> Option<S::Cursor>
where
    S: Successors + ?Sized,
{
    let start = start?;
    let mut inner = meeting_point(chain, Some(start.clone()))?;
    let mut outer = start;

    // The meeting point sits as many links before the entry as the start does
    while !S::same(&outer, &inner) {
        outer = chain.successor(&outer)?;
        inner = chain.successor(&inner)?;
    }
    Some(outer)
}

/// Number of nodes in the loop reachable from `start`, or `None` when the
/// chain terminates.
pub fn feedback_loop_len<S>(chain: &S, start: Option<S::Cursor>) -> Option<usize>
where
    S: Successors + ?Sized,
{
    let meet = meeting_point(chain, start)?;
    let mut cursor = chain.successor(&meet)?;
    let mut len = 1;
    while !S::same(&cursor, &meet) {
        cursor = chain.successor(&cursor)?;
        len += 1;
    }
    Some(len)
}

/// Tortoise and hare. Returns the node where both cursors coincide.
fn meeting_point<S>(chain: &S, start: Option<S::Cursor>) -> Option<S::Cursor>
where
    S: Successors + ?Sized,
{
    let mut slow = start?;
    let mut fast = slow.clone();

    loop {
        // Both hops of the fast cursor must exist, otherwise the chain ends
        let half = chain.successor(&fast)?;
        fast = chain.successor(&half)?;
        slow = chain.successor(&slow)?;

        if S::same(&slow, &fast) {
            return Some(slow);
        }
    }
}
