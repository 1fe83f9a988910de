//! Ownership of external handles for one run.
//!
//! Each handle (font, shaping buffer, glyph array, window, canvas, page) is
//! wrapped in a [`Tracked`] guard when it is acquired. Dropping the guard
//! releases the handle and records the release with the [`ResourceOwner`].
//! Guards live in locals or struct fields declared in acquisition order, so
//! Rust's drop order releases them in reverse, exactly once, including when a
//! later acquisition fails and `?` unwinds the function.

use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

/// The kinds of handles a run can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Font,
    ShapingBuffer,
    GlyphArray,
    Window,
    Canvas,
    Page,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Font => "font",
            ResourceKind::ShapingBuffer => "shaping buffer",
            ResourceKind::GlyphArray => "glyph array",
            ResourceKind::Window => "window",
            ResourceKind::Canvas => "canvas",
            ResourceKind::Page => "page",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceEvent {
    Acquired(ResourceKind),
    Released(ResourceKind),
}

/// Records acquisitions and releases for the handles of one run.
///
/// Cloning shares the same ledger.
#[derive(Debug, Clone, Default)]
pub struct ResourceOwner {
    ledger: Rc<RefCell<Vec<ResourceEvent>>>,
}

impl ResourceOwner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an already acquired handle.
    pub fn track<T>(&self, kind: ResourceKind, value: T) -> Tracked<T> {
        log::debug!("Acquired {}", kind);
        self.ledger.borrow_mut().push(ResourceEvent::Acquired(kind));
        Tracked {
            kind,
            value: Some(value),
            ledger: Rc::clone(&self.ledger),
        }
    }

    /// Run `acquire` and track its result. Nothing is recorded on failure.
    pub fn acquire<T, E>(
        &self,
        kind: ResourceKind,
        acquire: impl FnOnce() -> Result<T, E>,
    ) -> Result<Tracked<T>, E> {
        let value = acquire()?;
        Ok(self.track(kind, value))
    }

    /// Every acquisition and release so far, in order.
    pub fn events(&self) -> Vec<ResourceEvent> {
        self.ledger.borrow().clone()
    }

    /// Kinds acquired but not yet released, oldest first.
    pub fn held(&self) -> Vec<ResourceKind> {
        let mut held = Vec::new();
        for event in self.ledger.borrow().iter() {
            match *event {
                ResourceEvent::Acquired(kind) => held.push(kind),
                ResourceEvent::Released(kind) => {
                    if let Some(pos) = held.iter().rposition(|k| *k == kind) {
                        held.remove(pos);
                    }
                }
            }
        }
        held
    }

    /// Kinds in the order they were released.
    pub fn released(&self) -> Vec<ResourceKind> {
        self.ledger
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ResourceEvent::Released(kind) => Some(*kind),
                ResourceEvent::Acquired(_) => None,
            })
            .collect()
    }
}

/// A handle owned by a [`ResourceOwner`]. Released when dropped.
pub struct Tracked<T> {
    kind: ResourceKind,
    value: Option<T>,
    ledger: Rc<RefCell<Vec<ResourceEvent>>>,
}

impl<T> Tracked<T> {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.value.as_ref() {
            Some(value) => value,
            // Only taken inside drop
            None => unreachable!("tracked {} used after release", self.kind),
        }
    }
}

impl<T> DerefMut for Tracked<T> {
    fn deref_mut(&mut self) -> &mut T {
        match self.value.as_mut() {
            Some(value) => value,
            None => unreachable!("tracked {} used after release", self.kind),
        }
    }
}

impl<T> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracked")
            .field("kind", &self.kind)
            .field("held", &self.value.is_some())
            .finish()
    }
}

impl<T> Drop for Tracked<T> {
    fn drop(&mut self) {
        // Release the handle itself before recording it
        if let Some(value) = self.value.take() {
            drop(value);
            log::debug!("Released {}", self.kind);
            self.ledger
                .borrow_mut()
                .push(ResourceEvent::Released(self.kind));
        }
    }
}
