// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay stack implementation.
//!
//! ## Overview
//!
//! Keeps the ordered set of open overlays (last = topmost) and applies dismissal policy.
//!
//! ## Insertion
//!
//! - [`OverlayStack::add`] applies the closure policy of the new overlay's [`OverlayKind`]
//!   immediately, then queues the overlay.
//! - [`OverlayStack::commit`] appends queued overlays. Call it on the tick after the input
//!   event that opened them, so that event cannot also dismiss them.
//! - Re-adding an overlay that is already queued or committed promotes it to the top with
//!   no policy side effects.
//!
//! ## Dismissal
//!
//! - [`OverlayStack::handle_pointer_up`] closes every committed overlay that is off the
//!   event's composed path (and whose trigger is off it too) unless it vetoes, topmost first.
//! - [`OverlayStack::handle_key_down`] closes only the topmost overlay on Escape, one per
//!   key press, and only when the environment lacks native top-layer dismissal.
//! - Entries whose overlay was dropped or reports itself closed leave the stack at the start
//!   of the next interaction.
//!
//! ## Force-close groups
//!
//! Closing an overlay also closes the chain reached through
//! [`Overlay::force_close_parent`](crate::types::Overlay::force_close_parent) and every stack entry whose chain reaches a closed
//! overlay. Escape is the exception: it never closes more than one overlay.
//!
//! ## See Also
//!
//! [`path`](crate::path) for how ancestor paths cross from surfaces to their triggers.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cmp::Reverse;

use log::{debug, trace};

use crate::path::ancestor_path;
use crate::types::{ContainmentLookup, Key, NoContainment, OverlayKind, OverlayRc, OverlayRef};

struct Entry<K> {
    node: K,
    overlay: OverlayRef<K>,
}

impl<K> Entry<K> {
    fn new(node: K, overlay: &OverlayRc<K>) -> Self {
        Self {
            node,
            overlay: Rc::downgrade(overlay),
        }
    }
}

/// Ordered registry of open overlays and the authority on dismissal policy.
///
/// ## Usage
///
/// - Construct with [`OverlayStack::new`] when pointer events always carry a full composed
///   path, or with [`OverlayStack::with_containment`] to let the stack reconstruct paths
///   and ancestor chains through a [`ContainmentLookup`].
/// - Route the host's global pointer-up and key-down events to
///   [`OverlayStack::handle_pointer_up`] and [`OverlayStack::handle_key_down`].
/// - Register overlays with [`OverlayStack::add`] once they start showing and call
///   [`OverlayStack::commit`] on the next tick.
///
/// Every operation returns the overlays it closed, in closing order.
pub struct OverlayStack<K, C: ContainmentLookup<K> = NoContainment> {
    entries: Vec<Entry<K>>,
    queued: Vec<Entry<K>>,
    containment: C,
    native_top_layer: bool,
    listening: bool,
}

impl<K: Copy + Eq + core::fmt::Debug, C: ContainmentLookup<K>> core::fmt::Debug
    for OverlayStack<K, C>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let entries: Vec<K> = self.entries.iter().map(|e| e.node).collect();
        let queued: Vec<K> = self.queued.iter().map(|e| e.node).collect();
        f.debug_struct("OverlayStack")
            .field("entries", &entries)
            .field("queued", &queued)
            .field("native_top_layer", &self.native_top_layer)
            .field("listening", &self.listening)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + core::fmt::Debug, C: ContainmentLookup<K> + Default> Default
    for OverlayStack<K, C>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + core::fmt::Debug, C: ContainmentLookup<K> + Default> OverlayStack<K, C> {
    /// Create an empty, listening stack with a default containment lookup.
    pub fn new() -> Self {
        Self::with_containment(C::default())
    }
}

impl<K: Copy + Eq + core::fmt::Debug, C: ContainmentLookup<K>> OverlayStack<K, C> {
    /// Create an empty, listening stack with an explicit containment lookup.
    pub fn with_containment(containment: C) -> Self {
        Self {
            entries: Vec::new(),
            queued: Vec::new(),
            containment,
            native_top_layer: false,
            listening: true,
        }
    }

    /// Declare whether the environment dismisses top-layer surfaces on Escape by itself.
    ///
    /// When set, [`handle_key_down`](Self::handle_key_down) leaves Escape to the environment.
    pub fn set_native_top_layer(&mut self, native: bool) {
        self.native_top_layer = native;
    }

    /// Stop reacting to input. While detached, [`add`](Self::add), [`commit`](Self::commit)
    /// and the input handlers are inert; [`remove`](Self::remove) still closes overlays.
    pub fn detach_listeners(&mut self) {
        self.listening = false;
    }

    /// Resume reacting to input after [`detach_listeners`](Self::detach_listeners).
    pub fn attach_listeners(&mut self) {
        self.listening = true;
    }

    /// Whether the stack is currently reacting to input.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Number of committed overlays.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no overlay is committed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The topmost committed overlay.
    pub fn top(&self) -> Option<K> {
        self.entries.last().map(|e| e.node)
    }

    /// Committed overlays, bottom to top.
    pub fn nodes(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|e| e.node)
    }

    /// Whether `node` is a committed overlay.
    pub fn contains(&self, node: K) -> bool {
        position(&self.entries, node).is_some()
    }

    /// Whether `node` was added but not yet committed.
    pub fn is_queued(&self, node: K) -> bool {
        position(&self.queued, node).is_some()
    }

    /// Register an overlay, or promote it to the top if it is already registered.
    ///
    /// A new overlay first applies its kind's closure policy:
    /// - `Auto`, `Modal`, `Page`: close every other overlay that is neither `Manual` nor
    ///   an ancestor on the new overlay's logical path.
    /// - `Hint`: close every other `Hint`.
    /// - `Manual`: nothing.
    ///
    /// The overlay is then queued until the next [`commit`](Self::commit).
    /// Returns the overlays closed by policy.
    pub fn add(&mut self, overlay: &OverlayRc<K>) -> Vec<K> {
        if !self.listening {
            trace!("overlay {:?} added while detached; ignored", overlay.node());
            return Vec::new();
        }
        self.purge();
        let node = overlay.node();
        if promote(&mut self.entries, node) || promote(&mut self.queued, node) {
            debug!("overlay {node:?} promoted to top");
            return Vec::new();
        }

        let kind = overlay.kind();
        let (targets, exempt) = if kind.dismisses_others() {
            let path = self.ancestor_path(overlay);
            let targets: Vec<OverlayRc<K>> = self
                .live_top_first()
                .into_iter()
                .filter(|o| o.kind() != OverlayKind::Manual && !path.contains(&o.node()))
                .collect();
            (targets, path)
        } else if kind == OverlayKind::Hint {
            let targets: Vec<OverlayRc<K>> = self
                .live_top_first()
                .into_iter()
                .filter(|o| o.kind() == OverlayKind::Hint)
                .collect();
            (targets, Vec::new())
        } else {
            (Vec::new(), Vec::new())
        };

        let mut closed = Vec::new();
        for target in &targets {
            self.close_group(target, &exempt, &mut closed);
        }
        if !closed.is_empty() {
            debug!("adding {kind:?} overlay {node:?} closed {closed:?}");
        }
        self.queued.push(Entry::new(node, overlay));
        closed
    }

    /// Append queued overlays to the stack in the order they were added.
    ///
    /// Returns the overlays that became committed.
    pub fn commit(&mut self) -> Vec<K> {
        if !self.listening {
            return Vec::new();
        }
        let queued = core::mem::take(&mut self.queued);
        let mut out = Vec::new();
        for entry in queued {
            if entry.overlay.strong_count() == 0 {
                continue;
            }
            out.push(entry.node);
            self.entries.push(entry);
        }
        out
    }

    /// Close and unregister an overlay, along with its force-close group.
    ///
    /// An overlay that is not registered is still marked closed, but the stack is untouched.
    pub fn remove(&mut self, overlay: &OverlayRc<K>) -> Vec<K> {
        self.purge();
        let node = overlay.node();
        if !self.contains(node) && !self.is_queued(node) {
            let was_open = overlay.is_open();
            overlay.set_open(false);
            return if was_open {
                alloc::vec![node]
            } else {
                Vec::new()
            };
        }
        let mut closed = Vec::new();
        self.close_group(overlay, &[], &mut closed);
        closed
    }

    /// Unregister an overlay that closed on its own (for example after its hide transition).
    ///
    /// The overlay's open flag is left alone. Returns whether it was registered.
    pub fn overlay_closed(&mut self, node: K) -> bool {
        let removed = take(&mut self.entries, node).is_some() | take(&mut self.queued, node).is_some();
        if removed {
            debug!("overlay {node:?} closed externally");
        }
        removed
    }

    /// Light-dismiss overlays for a pointer-up whose composed path is `path`.
    ///
    /// An overlay survives when its own node or its trigger is on the path, or when it vetoes
    /// via [`Overlay::should_prevent_close`](crate::types::Overlay::should_prevent_close).
    /// The rest close topmost first, each with its force-close group. Overlays on the path
    /// are never closed through another overlay's group.
    pub fn handle_pointer_up(&mut self, path: &[K]) -> Vec<K> {
        if !self.listening {
            return Vec::new();
        }
        self.purge();
        let on_path = |o: &OverlayRc<K>| {
            path.contains(&o.node()) || o.trigger().is_some_and(|t| path.contains(&t))
        };
        // Snapshot before closing anything; closing mutates the live entries.
        let live: Vec<OverlayRc<K>> = self
            .entries
            .iter()
            .rev()
            .filter_map(|e| e.overlay.upgrade())
            .collect();
        let exempt: Vec<K> = live.iter().filter(|o| on_path(*o)).map(|o| o.node()).collect();
        let candidates: Vec<&OverlayRc<K>> = live
            .iter()
            .filter(|o| !on_path(*o) && !o.should_prevent_close())
            .collect();

        let mut closed = Vec::new();
        for candidate in candidates {
            if closed.contains(&candidate.node()) {
                continue;
            }
            self.close_group(candidate, &exempt, &mut closed);
        }
        if !closed.is_empty() {
            debug!("pointer-up outside closed {closed:?}");
        }
        closed
    }

    /// Light-dismiss overlays for a pointer-up on `target`, reconstructing the composed path
    /// through the containment lookup and the trigger links of registered surfaces.
    pub fn handle_pointer_up_at(&mut self, target: K) -> Vec<K> {
        let path = self.composed_path(target);
        self.handle_pointer_up(&path)
    }

    /// Handle a key press. On Escape, close the single topmost overlay.
    pub fn handle_key_down(&mut self, key: Key) -> Option<K> {
        if key != Key::Escape || !self.listening {
            return None;
        }
        if self.native_top_layer {
            trace!("escape left to native top layer");
            return None;
        }
        self.purge();
        let entry = self.entries.pop()?;
        if let Some(overlay) = entry.overlay.upgrade() {
            overlay.set_open(false);
        }
        debug!("escape closed overlay {:?}", entry.node);
        Some(entry.node)
    }

    /// The root→target composed path for an event on `target`.
    pub fn composed_path(&self, target: K) -> Vec<K> {
        ancestor_path(target, &self.containment, |n| self.surface_trigger(n))
    }

    /// The root→overlay logical ancestor path of `overlay`, crossing into triggers.
    pub fn ancestor_path(&self, overlay: &OverlayRc<K>) -> Vec<K> {
        let node = overlay.node();
        ancestor_path(node, &self.containment, |n| {
            if *n == node {
                overlay.trigger()
            } else {
                self.surface_trigger(n)
            }
        })
    }

    fn surface_trigger(&self, node: &K) -> Option<K> {
        self.entries
            .iter()
            .chain(self.queued.iter())
            .find(|e| e.node == *node)
            .and_then(|e| e.overlay.upgrade())
            .and_then(|o| o.trigger())
    }

    /// Drop entries whose overlay was dropped, and committed entries that closed on their own.
    fn purge(&mut self) {
        self.entries.retain(|e| e.overlay.upgrade().is_some_and(|o| o.is_open()));
        self.queued.retain(|e| e.overlay.strong_count() > 0);
    }

    /// Live overlays, queued ones first, each list topmost first.
    fn live_top_first(&self) -> Vec<OverlayRc<K>> {
        self.queued
            .iter()
            .rev()
            .chain(self.entries.iter().rev())
            .filter_map(|e| e.overlay.upgrade())
            .collect()
    }

    /// Bottom-to-top rank across committed then queued entries.
    fn rank(&self, node: K) -> Option<usize> {
        self.entries
            .iter()
            .chain(self.queued.iter())
            .position(|e| e.node == node)
    }

    /// The force-close group of `start`: its forward chain plus registered dependents.
    fn force_close_group(&self, start: &OverlayRc<K>) -> Vec<OverlayRc<K>> {
        let mut group: Vec<OverlayRc<K>> = Vec::new();
        push_chain(start, &mut group);
        loop {
            let mut grew = false;
            for entry in self.entries.iter().chain(self.queued.iter()) {
                if group.iter().any(|g| g.node() == entry.node) {
                    continue;
                }
                let Some(overlay) = entry.overlay.upgrade() else {
                    continue;
                };
                let mut chain = Vec::new();
                push_chain(&overlay, &mut chain);
                if chain
                    .iter()
                    .skip(1)
                    .any(|c| group.iter().any(|g| g.node() == c.node()))
                {
                    push_chain(&overlay, &mut group);
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }
        // Unwind registered overlays topmost first; unregistered chain links go last.
        group.sort_by_key(|o| Reverse(self.rank(o.node()).map(|r| r + 1).unwrap_or(0)));
        group
    }

    fn close_group(&mut self, start: &OverlayRc<K>, exempt: &[K], closed: &mut Vec<K>) {
        for overlay in self.force_close_group(start) {
            let node = overlay.node();
            if exempt.contains(&node) || closed.contains(&node) {
                continue;
            }
            let registered =
                take(&mut self.entries, node).is_some() | take(&mut self.queued, node).is_some();
            let was_open = overlay.is_open();
            overlay.set_open(false);
            if registered || was_open {
                closed.push(node);
            }
        }
    }
}

fn position<K: Eq>(list: &[Entry<K>], node: K) -> Option<usize> {
    list.iter().position(|e| e.node == node)
}

fn take<K: Eq>(list: &mut Vec<Entry<K>>, node: K) -> Option<Entry<K>> {
    position(list, node).map(|i| list.remove(i))
}

fn promote<K: Eq>(list: &mut Vec<Entry<K>>, node: K) -> bool {
    match take(list, node) {
        Some(entry) => {
            list.push(entry);
            true
        }
        None => false,
    }
}

/// Append `start` and its `force_close_parent` chain to `out`, stopping at known nodes.
fn push_chain<K: Copy + Eq>(start: &OverlayRc<K>, out: &mut Vec<OverlayRc<K>>) {
    let mut cur = Some(start.clone());
    while let Some(overlay) = cur {
        if out.iter().any(|o| o.node() == overlay.node()) {
            break;
        }
        cur = overlay.force_close_parent().and_then(|p| p.upgrade());
        out.push(overlay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Overlay, SimpleOverlay};
    use alloc::vec;

    // Logical containment used across tests:
    //   1 (page root) ─ 2 (anchor of surface 10)
    //   surface 10 ─ 11 (anchor of surface 20), 12
    //   surface 20 ─ 21
    #[derive(Default)]
    struct Parents;
    impl ContainmentLookup<u32> for Parents {
        fn parent_of(&self, node: &u32) -> Option<u32> {
            match *node {
                2 | 3 => Some(1),
                11 | 12 => Some(10),
                21 => Some(20),
                _ => None,
            }
        }
    }

    fn shown(node: u32, kind: OverlayKind) -> Rc<SimpleOverlay<u32>> {
        let o = Rc::new(SimpleOverlay::new(node, kind));
        o.set_open(true);
        o
    }

    fn shown_at(node: u32, kind: OverlayKind, trigger: u32) -> Rc<SimpleOverlay<u32>> {
        let o = Rc::new(SimpleOverlay::new(node, kind).with_trigger(trigger));
        o.set_open(true);
        o
    }

    fn rc(o: &Rc<SimpleOverlay<u32>>) -> OverlayRc<u32> {
        o.clone()
    }

    fn stack() -> OverlayStack<u32, Parents> {
        OverlayStack::new()
    }

    fn add_committed(s: &mut OverlayStack<u32, Parents>, o: &Rc<SimpleOverlay<u32>>) -> Vec<u32> {
        let closed = s.add(&rc(o));
        s.commit();
        closed
    }

    #[test]
    fn add_is_deferred_until_commit() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Auto);
        s.add(&rc(&a));
        assert!(s.is_empty());
        assert!(s.is_queued(10));
        assert_eq!(s.commit(), vec![10]);
        assert!(s.contains(10));
        assert!(!s.is_queued(10));
    }

    #[test]
    fn queued_overlay_survives_the_opening_pointer_up() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Auto);
        s.add(&rc(&a));
        assert!(s.handle_pointer_up(&[99]).is_empty());
        assert_eq!(s.handle_key_down(Key::Escape), None);
        assert!(a.is_open());
        s.commit();
        assert_eq!(s.handle_pointer_up(&[99]), vec![10]);
        assert!(!a.is_open());
    }

    #[test]
    fn readding_promotes_without_duplicates() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Manual);
        let b = shown(20, OverlayKind::Manual);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);
        add_committed(&mut s, &a);
        add_committed(&mut s, &a);
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![20, 10]);
        assert_eq!(s.top(), Some(10));
    }

    #[test]
    fn readding_queued_overlay_does_not_duplicate() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Auto);
        s.add(&rc(&a));
        assert!(s.add(&rc(&a)).is_empty());
        assert_eq!(s.commit(), vec![10]);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn promotion_has_no_policy_side_effects() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Auto);
        let n = shown(30, OverlayKind::Manual);
        add_committed(&mut s, &a);
        add_committed(&mut s, &n);
        // Re-adding the auto overlay must not close anything.
        assert!(add_committed(&mut s, &a).is_empty());
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![30, 10]);
    }

    #[test]
    fn escape_unwinds_one_overlay_per_press() {
        let mut s = stack();
        let a = shown_at(10, OverlayKind::Auto, 2);
        let b = shown_at(20, OverlayKind::Auto, 11);
        add_committed(&mut s, &a);
        // B is anchored inside A, so A is an ancestor and stays open.
        assert!(add_committed(&mut s, &b).is_empty());
        assert_eq!(s.len(), 2);

        assert_eq!(s.handle_key_down(Key::Escape), Some(20));
        assert!(!b.is_open());
        assert!(a.is_open());
        assert_eq!(s.handle_key_down(Key::Escape), Some(10));
        assert!(!a.is_open());
        assert_eq!(s.handle_key_down(Key::Escape), None);
    }

    #[test]
    fn escape_never_cascades() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Manual);
        let b = Rc::new(SimpleOverlay::new(20, OverlayKind::Manual).with_force_close_parent(&a));
        b.set_open(true);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);
        assert_eq!(s.handle_key_down(Key::Escape), Some(20));
        assert!(a.is_open());
        assert!(s.contains(10));
    }

    #[test]
    fn escape_ignored_with_native_top_layer_or_other_keys() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Auto);
        add_committed(&mut s, &a);
        assert_eq!(s.handle_key_down(Key::Other), None);
        s.set_native_top_layer(true);
        assert_eq!(s.handle_key_down(Key::Escape), None);
        assert!(a.is_open());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn modal_closes_auto_but_not_manual() {
        let mut s = stack();
        let x = shown(10, OverlayKind::Auto);
        let n = shown(30, OverlayKind::Manual);
        let m = shown(40, OverlayKind::Modal);
        add_committed(&mut s, &x);
        add_committed(&mut s, &n);
        assert_eq!(add_committed(&mut s, &m), vec![10]);
        assert!(!x.is_open());
        assert!(n.is_open());
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![30, 40]);
    }

    #[test]
    fn hint_replaces_only_the_previous_hint() {
        let mut s = stack();
        let x = shown(10, OverlayKind::Auto);
        let h1 = shown(50, OverlayKind::Hint);
        let h2 = shown(60, OverlayKind::Hint);
        add_committed(&mut s, &x);
        assert!(add_committed(&mut s, &h1).is_empty());
        assert_eq!(add_committed(&mut s, &h2), vec![50]);
        assert!(x.is_open());
        assert!(!h1.is_open());
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![10, 60]);
    }

    #[test]
    fn manual_add_has_no_side_effects() {
        let mut s = stack();
        let x = shown(10, OverlayKind::Auto);
        let h = shown(50, OverlayKind::Hint);
        let n = shown(30, OverlayKind::Manual);
        add_committed(&mut s, &x);
        add_committed(&mut s, &h);
        assert!(add_committed(&mut s, &n).is_empty());
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn unrelated_auto_replaces_then_outside_click_empties() {
        let mut s = stack();
        let a = shown_at(10, OverlayKind::Auto, 2);
        let b = shown_at(20, OverlayKind::Auto, 3);
        add_committed(&mut s, &a);
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![10]);
        assert_eq!(add_committed(&mut s, &b), vec![10]);
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![20]);
        assert_eq!(s.handle_pointer_up(&[1, 99]), vec![20]);
        assert!(s.is_empty());
    }

    #[test]
    fn click_inside_or_on_trigger_keeps_ancestor() {
        let mut s = stack();
        let a = shown_at(10, OverlayKind::Auto, 2);
        let b = shown_at(20, OverlayKind::Auto, 11);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);

        // Node 12 lives in A's content, outside B.
        assert_eq!(s.composed_path(12), vec![1, 2, 10, 12]);
        assert_eq!(s.handle_pointer_up_at(12), vec![20]);
        assert!(a.is_open());

        add_committed(&mut s, &b);
        // A click on A's trigger keeps A.
        assert_eq!(s.handle_pointer_up_at(2), vec![20]);
        assert!(a.is_open());
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn click_inside_nested_surface_keeps_whole_branch() {
        let mut s = stack();
        let a = shown_at(10, OverlayKind::Auto, 2);
        let b = shown_at(20, OverlayKind::Auto, 11);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);
        assert_eq!(s.composed_path(21), vec![1, 2, 10, 11, 20, 21]);
        assert!(s.handle_pointer_up_at(21).is_empty());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn click_inside_parent_keeps_it_despite_force_close_link() {
        let mut s = stack();
        let menu = shown_at(10, OverlayKind::Auto, 2);
        let sub = Rc::new(
            SimpleOverlay::new(20, OverlayKind::Auto)
                .with_trigger(11)
                .with_force_close_parent(&menu),
        );
        sub.set_open(true);
        add_committed(&mut s, &menu);
        assert!(add_committed(&mut s, &sub).is_empty());

        assert_eq!(s.handle_pointer_up_at(12), vec![20]);
        assert!(menu.is_open());
        assert!(!sub.is_open());
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn veto_survives_while_sibling_closes() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Manual);
        let b = shown(20, OverlayKind::Manual);
        a.set_prevent_close(true);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);
        assert_eq!(s.handle_pointer_up(&[99]), vec![20]);
        assert!(a.is_open());
        assert!(!b.is_open());
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn pointer_up_walks_force_close_chain() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Manual);
        let b = Rc::new(SimpleOverlay::new(20, OverlayKind::Manual).with_force_close_parent(&a));
        let c = Rc::new(SimpleOverlay::new(30, OverlayKind::Manual).with_force_close_parent(&b));
        b.set_open(true);
        c.set_open(true);
        a.set_prevent_close(true);
        b.set_prevent_close(true);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);
        add_committed(&mut s, &c);
        assert_eq!(s.handle_pointer_up(&[99]), vec![30, 20, 10]);
        assert!(!a.is_open());
        assert!(s.is_empty());
    }

    #[test]
    fn closing_a_parent_closes_dependents_transitively() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Manual);
        let b = Rc::new(SimpleOverlay::new(20, OverlayKind::Manual).with_force_close_parent(&a));
        let c = Rc::new(SimpleOverlay::new(30, OverlayKind::Manual).with_force_close_parent(&b));
        let other = shown(40, OverlayKind::Manual);
        b.set_open(true);
        c.set_open(true);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);
        add_committed(&mut s, &c);
        add_committed(&mut s, &other);
        assert_eq!(s.remove(&rc(&a)), vec![30, 20, 10]);
        assert!(!b.is_open());
        assert!(!c.is_open());
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![40]);
    }

    #[test]
    fn closing_a_child_closes_its_chain() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Manual);
        let b = Rc::new(SimpleOverlay::new(20, OverlayKind::Manual).with_force_close_parent(&a));
        b.set_open(true);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);
        assert_eq!(s.remove(&rc(&b)), vec![20, 10]);
        assert!(s.is_empty());
    }

    #[test]
    fn remove_absent_only_clears_open_flag() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Auto);
        let b = shown(20, OverlayKind::Manual);
        add_committed(&mut s, &b);
        assert_eq!(s.remove(&rc(&a)), vec![10]);
        assert!(!a.is_open());
        assert!(s.remove(&rc(&a)).is_empty());
        assert_eq!(s.nodes().collect::<Vec<_>>(), vec![20]);
    }

    #[test]
    fn detached_stack_is_inert() {
        let mut s = stack();
        s.detach_listeners();
        let a = shown(10, OverlayKind::Auto);
        assert!(s.add(&rc(&a)).is_empty());
        assert!(s.commit().is_empty());
        assert!(s.is_empty());
        assert!(!s.is_queued(10));

        s.attach_listeners();
        add_committed(&mut s, &a);
        s.detach_listeners();
        assert!(s.handle_pointer_up(&[99]).is_empty());
        assert_eq!(s.handle_key_down(Key::Escape), None);
        assert!(a.is_open());
    }

    #[test]
    fn dropped_overlays_are_purged() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Manual);
        let b = shown(20, OverlayKind::Manual);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);
        drop(b);
        assert_eq!(s.handle_key_down(Key::Escape), Some(10));
        assert!(s.is_empty());
    }

    #[test]
    fn self_closed_overlays_leave_on_next_interaction() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Manual);
        let b = shown(20, OverlayKind::Manual);
        add_committed(&mut s, &a);
        add_committed(&mut s, &b);
        b.set_open(false);
        // Escape reaches the overlay that is still showing.
        assert_eq!(s.handle_key_down(Key::Escape), Some(10));
        assert!(!a.is_open());
        assert!(s.is_empty());

        let c = shown(30, OverlayKind::Manual);
        add_committed(&mut s, &c);
        c.set_open(false);
        assert!(s.handle_pointer_up(&[99]).is_empty());
        assert!(s.is_empty());
    }

    #[test]
    fn externally_closed_overlay_is_unregistered() {
        let mut s = stack();
        let a = shown(10, OverlayKind::Auto);
        add_committed(&mut s, &a);
        assert!(s.overlay_closed(10));
        assert!(!s.overlay_closed(10));
        assert!(s.is_empty());
        // The stack does not touch the flag on external closes.
        assert!(a.is_open());
    }

    #[test]
    fn ancestor_path_crosses_trigger_links() {
        let mut s = stack();
        let a = shown_at(10, OverlayKind::Auto, 2);
        add_committed(&mut s, &a);
        let b: OverlayRc<u32> = shown_at(20, OverlayKind::Auto, 11);
        assert_eq!(s.ancestor_path(&b), vec![1, 2, 10, 11, 20]);
    }
}
