// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Overlay: a deterministic, `no_std` stack for floating UI surfaces.
//!
//! ## Overview
//!
//! Tooltips, popovers, menus, and dialogs are transient surfaces anchored to a trigger element.
//! This crate keeps the ordered set of those that are open and decides which of them close
//! when another opens, when the user clicks elsewhere, or when Escape is pressed.
//! It does not show, hide, or position surfaces; the presentation layer owns them and
//! implements the [`Overlay`](crate::types::Overlay) contract.
//!
//! ## Kinds
//!
//! Every overlay carries an [`OverlayKind`](crate::types::OverlayKind):
//! - `Auto`, `Modal`, `Page` close every other overlay that is not `Manual` and not one of
//!   their ancestors.
//! - `Hint` closes any other `Hint`, so at most one is visible.
//! - `Manual` never closes anything.
//!
//! ## Ancestors
//!
//! Ancestry is a tree walk over a [`ContainmentLookup`](crate::types::ContainmentLookup)
//! that also crosses from each surface to its trigger element (see [`path`](crate::path)).
//! A submenu anchored inside a menu therefore counts the menu as its ancestor.
//!
//! ## Input
//!
//! The host routes its global pointer-up and key-down events to the stack:
//! - Pointer-up closes every overlay off the event's composed path, topmost first,
//!   unless the overlay's trigger is on the path or it vetoes.
//! - Escape closes only the topmost overlay, once per key press.
//!
//! ## Workflow
//!
//! ```
//! use std::rc::Rc;
//! use understory_overlay::stack::OverlayStack;
//! use understory_overlay::types::{Key, Overlay, OverlayKind, OverlayRc, SimpleOverlay};
//!
//! let mut stack: OverlayStack<u32> = OverlayStack::new();
//!
//! let menu: OverlayRc<u32> = Rc::new(SimpleOverlay::new(10, OverlayKind::Auto).with_trigger(1));
//! menu.set_open(true);
//! stack.add(&menu);
//! // Commit on the next tick, after the opening event finished dispatching.
//! stack.commit();
//!
//! let tip: OverlayRc<u32> = Rc::new(SimpleOverlay::new(20, OverlayKind::Hint).with_trigger(2));
//! tip.set_open(true);
//! stack.add(&tip);
//! stack.commit();
//!
//! // Escape unwinds the topmost overlay only.
//! assert_eq!(stack.handle_key_down(Key::Escape), Some(20));
//! // A click on the menu's trigger keeps the menu open.
//! assert!(stack.handle_pointer_up(&[0, 1]).is_empty());
//! // A click elsewhere closes it.
//! assert_eq!(stack.handle_pointer_up(&[0, 5]), vec![10]);
//! assert!(!menu.is_open());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod path;
pub mod stack;
pub mod types;

pub use stack::OverlayStack;
pub use types::{ContainmentLookup, Key, NoContainment, Overlay, OverlayKind, OverlayRc, OverlayRef};
