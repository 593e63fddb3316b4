// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Trigger: per-anchor interaction engine for overlays.
//!
//! ## Overview
//!
//! A trigger binds one anchor element to up to three pieces of content, one per
//! [`Slot`](crate::types::Slot): click, hover, and longpress. Input on the anchor drives
//! an [`OpenMode`](crate::types::OpenMode) state machine; at most one slot is open at a time,
//! and opening a slot always tears down the others first.
//!
//! The trigger never shows anything itself. It asks a
//! [`SurfaceOpener`](crate::opener::SurfaceOpener) to show content and keeps the returned
//! [`Disposer`](crate::opener::Disposer) to hide it again. Openers typically register the
//! surface with an [`understory_overlay::OverlayStack`], which owns light dismiss and Escape.
//!
//! ## Async
//!
//! Opening is asynchronous. The engine spawns each open operation on a
//! [`LocalSpawn`](futures::task::LocalSpawn) executor supplied at construction and tracks it
//! until it settles; [`Trigger::settled`](crate::trigger::Trigger::settled) waits for all of
//! them. In-flight hover opens are aborted when a competing interaction wins.
//!
//! ## Workflow
//!
//! ```
//! use futures::FutureExt;
//! use futures::executor::LocalPool;
//! use understory_trigger::opener::{Disposer, OpenFuture, OpenRequest};
//! use understory_trigger::{OpenMode, Slot, Trigger};
//!
//! let mut pool = LocalPool::new();
//! let opener = |_req: OpenRequest<u32>| -> OpenFuture {
//!     async { Ok(Disposer::noop()) }.boxed_local()
//! };
//! let trigger = Trigger::new(1_u32, opener, pool.spawner());
//! trigger.set_content(Slot::Click, Some(10));
//! trigger.set_content(Slot::Hover, Some(20));
//!
//! trigger.pointer_enter();
//! assert_eq!(trigger.open_mode(), OpenMode::Hover);
//!
//! // Activation replaces the tooltip with the popover.
//! trigger.activate();
//! pool.run_until(trigger.settled());
//! assert!(trigger.is_open(Slot::Click));
//! assert!(!trigger.is_pending(Slot::Hover));
//! ```

pub mod describedby;
pub mod opener;
pub mod trigger;
pub mod types;

pub use opener::{Disposer, OpenError, OpenOptions, OpenRequest, SurfaceOpener};
pub use trigger::Trigger;
pub use types::{
    LongpressSource, OpenMode, Placement, ReceivesFocus, Slot, Slots, TriggerOptions,
};
