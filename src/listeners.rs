//! Scoped registration of surface-wide event listeners.
//!
//! While resizing, the editor needs pointer events from anywhere on screen,
//! not just over the canvas; while a tool is armed it needs key presses for
//! `Escape`. Each mode holds a [`ListenerGuard`] for as long as it is active.
//! Dropping the guard deregisters, so every exit path releases the listener,
//! including the element being deleted mid-resize or the editor going away.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tracing::trace;

/// Surface-wide listeners the host routes events to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    /// Pointer moves anywhere on screen
    PointerMove,
    /// Pointer release anywhere on screen
    PointerUp,
    /// Key presses regardless of focus
    KeyDown,
}

type Counts = Rc<RefCell<BTreeMap<ListenerKind, usize>>>;

/// Tracks which listeners are currently registered.
///
/// Registrations are reference counted so overlapping modes can hold the same
/// kind without stepping on each other.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    counts: Counts,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `kinds` until the returned guard is dropped
    #[must_use = "the listeners are released as soon as the guard is dropped"]
    pub fn register(&self, kinds: &[ListenerKind]) -> ListenerGuard {
        let mut counts = self.counts.borrow_mut();
        for kind in kinds {
            *counts.entry(*kind).or_default() += 1;
            trace!(?kind, "Listener registered");
        }
        ListenerGuard {
            kinds: kinds.to_vec(),
            counts: Rc::downgrade(&self.counts),
        }
    }

    pub fn is_active(&self, kind: ListenerKind) -> bool {
        self.counts.borrow().get(&kind).is_some_and(|n| *n > 0)
    }
}

/// Keeps listeners registered while alive
#[derive(Debug)]
pub struct ListenerGuard {
    kinds: Vec<ListenerKind>,
    counts: Weak<RefCell<BTreeMap<ListenerKind, usize>>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(counts) = self.counts.upgrade() else {
            return;
        };
        let mut counts = counts.borrow_mut();
        for kind in &self.kinds {
            if let Some(n) = counts.get_mut(kind) {
                *n = n.saturating_sub(1);
                if *n == 0 {
                    counts.remove(kind);
                }
            }
            trace!(?kind, "Listener released");
        }
    }
}
