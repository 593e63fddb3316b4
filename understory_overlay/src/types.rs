// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for the overlay stack: kinds, the overlay contract, containment lookups, and keys.
//!
//! ## Overview
//!
//! An overlay is a floating surface (tooltip, popover, menu, dialog) owned by the presentation
//! layer. The [stack](crate::stack::OverlayStack) only holds weak references to overlays while
//! they are open, and talks to them exclusively through the [`Overlay`] trait.

use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

/// Closure policy applied to other overlays when an overlay is added to the stack.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OverlayKind {
    /// Closes every other non-ancestor overlay that is not [`Manual`](Self::Manual).
    #[default]
    Auto,
    /// Same closure policy as [`Auto`](Self::Auto).
    Modal,
    /// Same closure policy as [`Auto`](Self::Auto).
    Page,
    /// Closes any other open hint; leaves every other kind alone.
    Hint,
    /// No side effects on other overlays.
    Manual,
}

impl OverlayKind {
    /// Whether adding an overlay of this kind dismisses unrelated overlays.
    pub const fn dismisses_others(self) -> bool {
        matches!(self, Self::Auto | Self::Modal | Self::Page)
    }
}

/// Shared, owning handle to an overlay held by the presentation layer.
pub type OverlayRc<K> = Rc<dyn Overlay<K>>;

/// Non-owning handle to an overlay, as held by the stack and by force-close links.
pub type OverlayRef<K> = Weak<dyn Overlay<K>>;

/// The contract a floating surface satisfies to participate in the stack.
///
/// Overlays are shared behind [`Rc`], so mutation goes through interior mutability
/// (see [`SimpleOverlay`] for a ready-made implementation).
pub trait Overlay<K> {
    /// Identity of the overlay: the root node of its surface.
    fn node(&self) -> K;

    /// Closure policy of this overlay.
    fn kind(&self) -> OverlayKind;

    /// Whether the surface is currently open.
    fn is_open(&self) -> bool;

    /// Set the open flag. The stack calls this with `false` when it closes the overlay.
    fn set_open(&self, open: bool);

    /// The anchor element that produced this overlay, if any.
    fn trigger(&self) -> Option<K> {
        None
    }

    /// An overlay that must be closed whenever this one closes.
    fn force_close_parent(&self) -> Option<OverlayRef<K>> {
        None
    }

    /// Veto consulted before a light dismiss. Returning `true` keeps this overlay open.
    fn should_prevent_close(&self) -> bool {
        false
    }
}

/// Look up the logical container of a node.
///
/// The stack consults this to build ancestor paths for new overlays and to reconstruct
/// the composed path of a pointer event from its target.
pub trait ContainmentLookup<K> {
    /// Returns the container of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// A containment provider where every node is a root.
///
/// Used when callers always supply full composed paths.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoContainment;

impl<K> ContainmentLookup<K> for NoContainment {
    #[inline]
    fn parent_of(&self, _node: &K) -> Option<K> {
        None
    }
}

impl<K, F: Fn(&K) -> Option<K>> ContainmentLookup<K> for F {
    #[inline]
    fn parent_of(&self, node: &K) -> Option<K> {
        self(node)
    }
}

/// Key classification for the stack's key-down handler.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Key {
    /// The Escape key.
    Escape,
    /// Any other key; ignored by the stack.
    Other,
}

/// A plain [`Overlay`] implementation backed by cells.
///
/// Suitable for hosts that do not need custom behavior behind the contract.
///
/// ```
/// use std::rc::Rc;
/// use understory_overlay::types::{Overlay, OverlayKind, SimpleOverlay};
///
/// let menu = Rc::new(SimpleOverlay::new(10_u32, OverlayKind::Auto).with_trigger(1));
/// let submenu = SimpleOverlay::new(20_u32, OverlayKind::Auto)
///     .with_trigger(11)
///     .with_force_close_parent(&menu);
/// assert_eq!(submenu.trigger(), Some(11));
/// assert_eq!(submenu.force_close_parent().and_then(|p| p.upgrade()).map(|p| p.node()), Some(10));
/// ```
pub struct SimpleOverlay<K> {
    node: K,
    kind: OverlayKind,
    open: Cell<bool>,
    trigger: Option<K>,
    parent: RefCell<Option<OverlayRef<K>>>,
    prevent_close: Cell<bool>,
}

impl<K: Copy + core::fmt::Debug> core::fmt::Debug for SimpleOverlay<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimpleOverlay")
            .field("node", &self.node)
            .field("kind", &self.kind)
            .field("open", &self.open.get())
            .field("trigger", &self.trigger)
            .field("prevent_close", &self.prevent_close.get())
            .finish_non_exhaustive()
    }
}

impl<K> SimpleOverlay<K> {
    /// Create a closed overlay with no trigger and no force-close parent.
    pub fn new(node: K, kind: OverlayKind) -> Self {
        Self {
            node,
            kind,
            open: Cell::new(false),
            trigger: None,
            parent: RefCell::new(None),
            prevent_close: Cell::new(false),
        }
    }

    /// Set the anchor element that produced this overlay.
    pub fn with_trigger(mut self, trigger: K) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Link an overlay that must close whenever this one closes.
    pub fn with_force_close_parent<O: Overlay<K> + 'static>(self, parent: &Rc<O>) -> Self {
        let weak: OverlayRef<K> = Rc::downgrade(parent) as Weak<dyn Overlay<K>>;
        *self.parent.borrow_mut() = Some(weak);
        self
    }

    /// Replace or clear the force-close link after construction.
    pub fn set_force_close_parent(&self, parent: Option<OverlayRef<K>>) {
        *self.parent.borrow_mut() = parent;
    }

    /// Set the light-dismiss veto.
    pub fn set_prevent_close(&self, prevent: bool) {
        self.prevent_close.set(prevent);
    }
}

impl<K: Copy> Overlay<K> for SimpleOverlay<K> {
    fn node(&self) -> K {
        self.node
    }

    fn kind(&self) -> OverlayKind {
        self.kind
    }

    fn is_open(&self) -> bool {
        self.open.get()
    }

    fn set_open(&self, open: bool) {
        self.open.set(open);
    }

    fn trigger(&self) -> Option<K> {
        self.trigger
    }

    fn force_close_parent(&self) -> Option<OverlayRef<K>> {
        self.parent.borrow().clone()
    }

    fn should_prevent_close(&self) -> bool {
        self.prevent_close.get()
    }
}
