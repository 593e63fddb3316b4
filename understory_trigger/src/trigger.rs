// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trigger implementation.
//!
//! ## Overview
//!
//! A [`Trigger`] decides, for one anchor, which of its three content slots is shown.
//! Input handlers and [`Trigger::set_open_mode`] drive a small state machine over
//! [`OpenMode`]; every transition that opens a slot first force-closes all slots.
//!
//! ## Open operations
//!
//! - Opening a slot calls the [`SurfaceOpener`] and spawns the resulting future on the
//!   trigger's [`LocalSpawn`]. The slot counts as pending from that moment.
//! - A second request for a pending slot is ignored.
//! - Hover requests carry an abort handle. Superseding an in-flight hover aborts it, so
//!   the opener's future is dropped and never commits.
//! - Other superseded opens run to completion and are hidden as soon as they resolve.
//! - [`Trigger::settled`] resolves once no open operation is in flight.
//!
//! ## Hover bridging
//!
//! Leaving the anchor towards its own hover content keeps the hover slot open. A one-shot
//! watch on the content's pointer-leave closes it once the pointer leaves the content for
//! anywhere but the anchor.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use futures::future::{AbortHandle, Abortable, FutureExt, LocalBoxFuture, Shared, join_all};
use futures::task::{LocalSpawn, LocalSpawnExt};
use log::{debug, trace, warn};
use understory_overlay::path::ancestor_path;
use understory_overlay::types::{ContainmentLookup, NoContainment};

use crate::describedby::{DescribedBy, LongpressDescriptor};
use crate::opener::{AbortSignal, Disposer, OpenError, OpenOptions, OpenRequest, SurfaceOpener};
use crate::types::{LongpressSource, OpenMode, ReceivesFocus, Slot, Slots, TriggerOptions};

type Task = Shared<LocalBoxFuture<'static, ()>>;

enum Surface {
    Opening,
    Open(Disposer),
    Closed,
}

struct PendingOpen {
    ticket: u64,
    abort: Option<AbortHandle>,
    surface: Rc<RefCell<Surface>>,
}

impl PendingOpen {
    /// Cancel the operation and hand back the disposer if the surface is showing.
    fn cancel(self) -> Option<Disposer> {
        if let Some(abort) = &self.abort {
            abort.abort();
        }
        match core::mem::replace(&mut *self.surface.borrow_mut(), Surface::Closed) {
            Surface::Open(disposer) => Some(disposer),
            Surface::Opening | Surface::Closed => None,
        }
    }
}

struct State<K> {
    open_mode: OpenMode,
    disabled: bool,
    content: [Option<K>; 3],
    pending: [Option<PendingOpen>; 3],
    next_ticket: u64,
    // One-shot watch on the hover content's pointer-leave.
    hover_leave_armed: bool,
    described_by: DescribedBy,
    descriptor: Option<LongpressDescriptor>,
    in_flight: Vec<Task>,
}

struct Inner<K> {
    anchor: K,
    opener: Box<dyn SurfaceOpener<K>>,
    spawner: Box<dyn LocalSpawn>,
    containment: Box<dyn ContainmentLookup<K>>,
    options: TriggerOptions,
    state: RefCell<State<K>>,
}

impl<K> Inner<K> {
    fn forget(&self, slot: Slot, ticket: u64) {
        let mut st = self.state.borrow_mut();
        let idx = slot.index();
        if st.pending[idx].as_ref().is_some_and(|p| p.ticket == ticket) {
            st.pending[idx] = None;
            if st.open_mode == OpenMode::from(slot) {
                st.open_mode = OpenMode::None;
            }
        }
    }
}

impl<K> Drop for Inner<K> {
    fn drop(&mut self) {
        let st = self.state.get_mut();
        let pending: Vec<PendingOpen> = st.pending.iter_mut().filter_map(Option::take).collect();
        for p in pending {
            if let Some(mut disposer) = p.cancel() {
                disposer.dispose();
            }
        }
    }
}

/// Interaction engine for one anchor element.
///
/// ## Usage
///
/// - Construct with [`Trigger::new`], or [`Trigger::with_options`] to supply a
///   [`ContainmentLookup`] (needed for hover bridging) and [`TriggerOptions`].
/// - Declare content with [`Trigger::set_content`].
/// - Forward the anchor's input to [`activate`](Trigger::activate),
///   [`pointer_enter`](Trigger::pointer_enter), [`pointer_leave`](Trigger::pointer_leave),
///   [`focus_in`](Trigger::focus_in), [`focus_out`](Trigger::focus_out),
///   [`longpress`](Trigger::longpress), and the hover content's pointer events to
///   [`content_pointer_enter`](Trigger::content_pointer_enter) and
///   [`content_pointer_leave`](Trigger::content_pointer_leave).
/// - Report surfaces closed by the overlay stack with [`Trigger::surface_closed`].
///
/// Cloning yields another handle to the same engine. Dropping the last handle closes
/// every slot.
pub struct Trigger<K> {
    inner: Rc<Inner<K>>,
}

impl<K> Clone for Trigger<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: core::fmt::Debug> core::fmt::Debug for Trigger<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let st = self.inner.state.borrow();
        f.debug_struct("Trigger")
            .field("anchor", &self.inner.anchor)
            .field("open_mode", &st.open_mode)
            .field("disabled", &st.disabled)
            .finish_non_exhaustive()
    }
}

impl<K: Copy + Eq + core::fmt::Debug + 'static> Trigger<K> {
    /// Create a trigger with default options and no containment information.
    pub fn new(
        anchor: K,
        opener: impl SurfaceOpener<K> + 'static,
        spawner: impl LocalSpawn + 'static,
    ) -> Self {
        Self::with_options(
            anchor,
            opener,
            spawner,
            NoContainment,
            TriggerOptions::default(),
        )
    }

    /// Create a trigger with explicit containment and options.
    pub fn with_options(
        anchor: K,
        opener: impl SurfaceOpener<K> + 'static,
        spawner: impl LocalSpawn + 'static,
        containment: impl ContainmentLookup<K> + 'static,
        options: TriggerOptions,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                anchor,
                opener: Box::new(opener),
                spawner: Box::new(spawner),
                containment: Box::new(containment),
                options,
                state: RefCell::new(State {
                    open_mode: OpenMode::None,
                    disabled: false,
                    content: [None; 3],
                    pending: [None, None, None],
                    next_ticket: 0,
                    hover_leave_armed: false,
                    described_by: DescribedBy::default(),
                    descriptor: None,
                    in_flight: Vec::new(),
                }),
            }),
        }
    }

    /// The anchor element.
    pub fn anchor(&self) -> K {
        self.inner.anchor
    }

    /// Options forwarded to the opener.
    pub fn options(&self) -> &TriggerOptions {
        &self.inner.options
    }

    /// The slot currently requested open.
    pub fn open_mode(&self) -> OpenMode {
        self.inner.state.borrow().open_mode
    }

    /// Whether opening is suppressed.
    pub fn is_disabled(&self) -> bool {
        self.inner.state.borrow().disabled
    }

    /// Content element declared for `slot`.
    pub fn content(&self, slot: Slot) -> Option<K> {
        self.inner.state.borrow().content[slot.index()]
    }

    /// Slots that have content.
    pub fn available_slots(&self) -> Slots {
        let st = self.inner.state.borrow();
        Slot::ALL
            .into_iter()
            .filter(|s| st.content[s.index()].is_some())
            .fold(Slots::empty(), |acc, s| acc | s.mask())
    }

    /// Whether `slot` has an open operation in flight or a surface showing.
    pub fn is_pending(&self, slot: Slot) -> bool {
        self.inner.state.borrow().pending[slot.index()].is_some()
    }

    /// Whether the surface for `slot` finished opening and is showing.
    pub fn is_open(&self, slot: Slot) -> bool {
        self.inner.state.borrow().pending[slot.index()]
            .as_ref()
            .is_some_and(|p| matches!(*p.surface.borrow(), Surface::Open(_)))
    }

    /// Declare or clear the content element for `slot`.
    ///
    /// Changing the content of a pending slot closes it. Longpress content also attaches
    /// or detaches the anchor's longpress descriptor.
    pub fn set_content(&self, slot: Slot, content: Option<K>) {
        let close = {
            let mut st = self.inner.state.borrow_mut();
            let st = &mut *st;
            let idx = slot.index();
            let previous = core::mem::replace(&mut st.content[idx], content);
            if slot == Slot::Longpress {
                match content {
                    Some(_) if st.descriptor.is_none() => {
                        let id = self.inner.options.descriptor_id.clone();
                        st.described_by.insert(&id);
                        st.descriptor = Some(LongpressDescriptor { id });
                    }
                    None => {
                        if let Some(descriptor) = st.descriptor.take() {
                            st.described_by.remove(&descriptor.id);
                        }
                    }
                    Some(_) => {}
                }
            }
            previous != content && st.pending[idx].is_some()
        };
        if close {
            debug!(
                "trigger {:?}: {slot:?} content changed while pending; closing",
                self.inner.anchor
            );
            self.close_slot(slot);
        }
    }

    /// Drive the state machine to `mode`.
    ///
    /// Opening a slot that is disabled, lacks content, or is already pending does nothing.
    /// Otherwise every slot is force-closed before the new slot starts opening.
    pub fn set_open_mode(&self, mode: OpenMode) {
        match mode.slot() {
            Some(slot) => self.open_slot(slot, None),
            None => self.close_slots(Slots::all()),
        }
    }

    /// Primary activation of the anchor: toggles the click slot.
    pub fn activate(&self) {
        if self.open_mode() == OpenMode::Click {
            self.set_open_mode(OpenMode::None);
        } else {
            self.set_open_mode(OpenMode::Click);
        }
    }

    /// Pointer entered the anchor.
    pub fn pointer_enter(&self) {
        self.inner.state.borrow_mut().hover_leave_armed = false;
        self.request_hover();
    }

    /// Focus moved into the anchor.
    pub fn focus_in(&self) {
        self.pointer_enter();
    }

    /// Pointer left the anchor for `related` (the element it moved onto, if known).
    pub fn pointer_leave(&self, related: Option<K>) {
        let (mode, hover_content) = {
            let st = self.inner.state.borrow();
            (st.open_mode, st.content[Slot::Hover.index()])
        };
        if mode != OpenMode::Hover {
            return;
        }
        if let (Some(related), Some(content)) = (related, hover_content)
            && self.is_within(related, content)
        {
            trace!(
                "trigger {:?}: pointer moved into hover content; deferring close",
                self.inner.anchor
            );
            self.inner.state.borrow_mut().hover_leave_armed = true;
            return;
        }
        self.close_slot(Slot::Hover);
    }

    /// Focus left the anchor for `related`.
    pub fn focus_out(&self, related: Option<K>) {
        self.pointer_leave(related);
    }

    /// Pointer entered the hover content.
    pub fn content_pointer_enter(&self) {
        self.request_hover();
    }

    /// Pointer left the hover content for `related`.
    ///
    /// Only acts when armed by a previous [`pointer_leave`](Self::pointer_leave) into the
    /// content; the watch fires once.
    pub fn content_pointer_leave(&self, related: Option<K>) {
        let armed = core::mem::take(&mut self.inner.state.borrow_mut().hover_leave_armed);
        if !armed {
            return;
        }
        if related.is_some_and(|r| self.is_within(r, self.inner.anchor)) {
            trace!(
                "trigger {:?}: pointer returned to anchor from hover content",
                self.inner.anchor
            );
            return;
        }
        if self.open_mode() == OpenMode::Hover {
            self.close_slot(Slot::Hover);
        }
    }

    /// A long-press gesture was recognized on the anchor.
    ///
    /// The surface takes focus, and unless the gesture came from the keyboard it is marked
    /// as not immediately closable so the end of the gesture does not dismiss it.
    pub fn longpress(&self, source: LongpressSource) {
        self.open_slot(Slot::Longpress, Some(source));
    }

    /// Enable or disable the trigger. Disabling force-closes every slot.
    pub fn set_disabled(&self, disabled: bool) {
        self.inner.state.borrow_mut().disabled = disabled;
        if disabled {
            debug!("trigger {:?} disabled", self.inner.anchor);
            self.close_slots(Slots::all());
        }
    }

    /// Force-close the given slots, cancelling in-flight hover opens.
    pub fn close_slots(&self, slots: Slots) {
        for slot in slots.slots() {
            self.close_slot(slot);
        }
    }

    /// The surface for `slot` was closed from outside (for example by the overlay stack).
    pub fn surface_closed(&self, slot: Slot) {
        self.close_slot(slot);
    }

    /// Wait until no open operation is in flight.
    pub async fn settled(&self) {
        loop {
            let tasks: Vec<Task> = {
                let mut st = self.inner.state.borrow_mut();
                st.in_flight.retain(|t| t.peek().is_none());
                st.in_flight.clone()
            };
            if tasks.is_empty() {
                return;
            }
            join_all(tasks).await;
        }
    }

    /// The anchor's description-reference list, including the longpress descriptor id.
    pub fn described_by(&self) -> String {
        self.inner.state.borrow().described_by.to_string()
    }

    /// Seed the anchor's description-reference list with the host's own tokens.
    ///
    /// The longpress descriptor id stays in the list while longpress content is set.
    pub fn set_described_by(&self, value: &str) {
        let mut st = self.inner.state.borrow_mut();
        let mut refs = DescribedBy::parse(value);
        if let Some(descriptor) = &st.descriptor {
            refs.insert(&descriptor.id);
        }
        st.described_by = refs;
    }

    /// The longpress descriptor to render next to the anchor, if any.
    pub fn longpress_descriptor(&self) -> Option<LongpressDescriptor> {
        self.inner.state.borrow().descriptor.clone()
    }

    fn request_hover(&self) {
        let mode = self.open_mode();
        // Hovering never replaces a click or longpress surface.
        if matches!(mode, OpenMode::Click | OpenMode::Longpress) {
            trace!(
                "trigger {:?}: hover ignored while {mode:?} is open",
                self.inner.anchor
            );
            return;
        }
        self.open_slot(Slot::Hover, None);
    }

    fn is_within(&self, node: K, container: K) -> bool {
        ancestor_path(node, &*self.inner.containment, |_| None).contains(&container)
    }

    fn open_slot(&self, slot: Slot, longpress: Option<LongpressSource>) {
        let anchor = self.inner.anchor;
        let content = {
            let st = self.inner.state.borrow();
            if st.disabled {
                trace!("trigger {anchor:?} is disabled; {slot:?} not opened");
                return;
            }
            let Some(content) = st.content[slot.index()] else {
                trace!("trigger {anchor:?} has no {slot:?} content");
                return;
            };
            if st.pending[slot.index()].is_some() {
                trace!("trigger {anchor:?}: {slot:?} already opening");
                return;
            }
            content
        };

        self.close_slots(Slots::all());

        let (abort, registration) = if slot == Slot::Hover {
            let (handle, registration) = AbortHandle::new_pair();
            (Some(handle), Some(registration))
        } else {
            (None, None)
        };
        let options = OpenOptions {
            placement: self.inner.options.placement,
            offset: self.inner.options.offset,
            receives_focus: if longpress.is_some() {
                ReceivesFocus::Always
            } else {
                self.inner.options.receives_focus
            },
            abort: abort.clone().map(AbortSignal::new),
            not_immediately_closable: longpress.is_some_and(|s| s != LongpressSource::Keyboard),
        };

        let surface = Rc::new(RefCell::new(Surface::Opening));
        let ticket = {
            let mut st = self.inner.state.borrow_mut();
            let ticket = st.next_ticket;
            st.next_ticket += 1;
            st.pending[slot.index()] = Some(PendingOpen {
                ticket,
                abort,
                surface: surface.clone(),
            });
            st.open_mode = slot.into();
            st.hover_leave_armed = false;
            ticket
        };
        debug!("trigger {anchor:?}: opening {slot:?} content {content:?}");

        let open = self.inner.opener.open(OpenRequest {
            trigger: anchor,
            slot,
            content,
            options,
        });
        let weak = Rc::downgrade(&self.inner);
        let task = async move {
            let result = match registration {
                Some(registration) => Abortable::new(open, registration)
                    .await
                    .unwrap_or(Err(OpenError::Aborted)),
                None => open.await,
            };
            settle_open(&weak, slot, ticket, &surface, result);
        }
        .boxed_local()
        .shared();
        self.track(task);
    }

    fn track(&self, task: Task) {
        {
            let mut st = self.inner.state.borrow_mut();
            st.in_flight.retain(|t| t.peek().is_none());
            st.in_flight.push(task.clone());
        }
        if let Err(err) = self.inner.spawner.spawn_local(task) {
            // The task still completes when awaited through `settled`.
            warn!(
                "trigger {:?}: could not spawn open task: {err}",
                self.inner.anchor
            );
        }
    }

    fn close_slot(&self, slot: Slot) {
        let pending = {
            let mut st = self.inner.state.borrow_mut();
            if st.open_mode == OpenMode::from(slot) {
                st.open_mode = OpenMode::None;
            }
            if slot == Slot::Hover {
                st.hover_leave_armed = false;
            }
            st.pending[slot.index()].take()
        };
        let Some(pending) = pending else {
            return;
        };
        debug!("trigger {:?}: closing {slot:?}", self.inner.anchor);
        // Hide outside the state borrow; the host may call back into the trigger.
        if let Some(mut disposer) = pending.cancel() {
            disposer.dispose();
        }
    }
}

fn settle_open<K>(
    weak: &Weak<Inner<K>>,
    slot: Slot,
    ticket: u64,
    surface: &Rc<RefCell<Surface>>,
    result: Result<Disposer, OpenError>,
) {
    match result {
        Ok(mut disposer) => {
            let mut s = surface.borrow_mut();
            if matches!(*s, Surface::Opening) {
                *s = Surface::Open(disposer);
                debug!("{slot:?} surface shown");
            } else {
                drop(s);
                debug!("{slot:?} surface superseded while opening; hiding");
                disposer.dispose();
            }
        }
        Err(err) => {
            debug!("{slot:?} surface did not open: {err}");
            *surface.borrow_mut() = Surface::Closed;
            if let Some(inner) = weak.upgrade() {
                inner.forget(slot, ticket);
            }
        }
    }
}
