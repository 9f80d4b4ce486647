//! Shared-Ownership Chains
//!
//! Stages linked through strong `Rc` pointers, the way a host without an arena
//! would wire them. Any stage can be the successor of several others, and a
//! successor may point back up the chain. When it does, every stage on the
//! loop keeps the next one alive and reference counting alone never frees
//! them.
//!
//! [`detect_shared_feedback`] finds such loops by pointer identity, and
//! [`break_feedback`] cuts the closing link so the stages can be dropped.

use crate::detect::{self, Successors};
use crate::stage::{Process, Transform};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Owning handle to a shared stage
pub type StageRef = Rc<SharedStage>;

/// A stage whose successor is a strong shared pointer
#[derive(Default)]
pub struct SharedStage {
    transform: RefCell<Transform>,
    next: RefCell<Option<StageRef>>,
}

impl SharedStage {
    pub fn new(transform: Transform) -> StageRef {
        Rc::new(Self {
            transform: RefCell::new(transform),
            next: RefCell::new(None),
        })
    }

    /// The current successor, if any
    pub fn next(&self) -> Option<StageRef> {
        self.next.borrow().clone()
    }

    /// Replace the successor, returning the previous one
    pub fn set_next(&self, next: Option<StageRef>) -> Option<StageRef> {
        self.next.replace(next)
    }

    pub fn transform(&self) -> Transform {
        *self.transform.borrow()
    }

    pub fn set_transform(&self, transform: Transform) {
        *self.transform.borrow_mut() = transform;
    }

    /// Apply this stage's transform to the first `length` samples of `buffer`
    pub fn process(&self, buffer: &mut [f32], length: usize) {
        let length = length.min(buffer.len());
        self.transform.borrow().process(&mut buffer[..length]);
    }
}

// Unlink iteratively so dropping a long chain does not recurse once per stage
impl Drop for SharedStage {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(stage) = next {
            next = match Rc::try_unwrap(stage) {
                Ok(owned) => owned.next.take(),
                Err(_) => None,
            };
        }
    }
}

// Following `next` here would recurse forever on a loop
impl fmt::Debug for SharedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStage")
            .field("transform", &*self.transform.borrow())
            .field("linked", &self.next.borrow().is_some())
            .finish()
    }
}

/// Traversal of `Rc`-linked stages, comparing stages by pointer
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedChain;

impl Successors for SharedChain {
    type Cursor = StageRef;

    fn successor(&self, cursor: &StageRef) -> Option<StageRef> {
        cursor.next()
    }

    fn same(a: &StageRef, b: &StageRef) -> bool {
        Rc::ptr_eq(a, b)
    }
}

/// Whether the chain starting at `start` loops back on itself
pub fn detect_shared_feedback(start: Option<&StageRef>) -> bool {
    detect::detect_feedback(&SharedChain, start.cloned())
}

/// Cut the link that closes the loop reachable from `start`.
///
/// The loop member pointing back at the entry stage loses its successor, so
/// the chain becomes finite and its stages can be freed. Returns `false` if
/// there was no loop to break.
pub fn break_feedback(start: Option<&StageRef>) -> bool {
    let Some(entry) = detect::find_feedback_entry(&SharedChain, start.cloned()) else {
        return false;
    };

    let mut cursor = entry.clone();
    while let Some(next) = cursor.next() {
        if Rc::ptr_eq(&next, &entry) {
            cursor.set_next(None);

            #[cfg(feature = "tracing")]
            tracing::debug!("shared_break: cut link closing a feedback loop");

            return true;
        }
        cursor = next;
    }
    false
}
