// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay stack basics: a menu with a submenu and a tooltip.
//!
//! This example registers overlays directly with an [`OverlayStack`] and shows
//! ancestor exemption, Escape unwinding, and pointer-up light dismiss.
//!
//! Run:
//! - `cargo run -p understory_demos --example overlay_stack_basics`

use std::rc::Rc;

use understory_overlay::stack::OverlayStack;
use understory_overlay::types::{Key, Overlay, OverlayKind, OverlayRc, SimpleOverlay};

const ROOT: u32 = 0;
const BUTTON: u32 = 1;
const ELSEWHERE: u32 = 5;
const MENU: u32 = 10;
const MENU_ITEM: u32 = 11;
const TIP: u32 = 20;
const SUBMENU: u32 = 30;
const SUBMENU_ITEM: u32 = 31;
const TOAST: u32 = 40;
const DIALOG: u32 = 50;

fn parent_of(node: &u32) -> Option<u32> {
    match *node {
        MENU_ITEM => Some(MENU),
        SUBMENU_ITEM => Some(SUBMENU),
        ROOT => None,
        _ => Some(ROOT),
    }
}

fn shown(node: u32, kind: OverlayKind, trigger: u32) -> Rc<SimpleOverlay<u32>> {
    let overlay = Rc::new(SimpleOverlay::new(node, kind).with_trigger(trigger));
    overlay.set_open(true);
    overlay
}

fn main() {
    let mut stack = OverlayStack::with_containment(parent_of as fn(&u32) -> Option<u32>);

    let menu = shown(MENU, OverlayKind::Auto, BUTTON);
    let menu_rc: OverlayRc<u32> = menu.clone();
    stack.add(&menu_rc);
    stack.commit();

    // The submenu hangs off an item inside the menu, so the menu is its ancestor.
    let submenu: OverlayRc<u32> = Rc::new(
        SimpleOverlay::new(SUBMENU, OverlayKind::Auto)
            .with_trigger(MENU_ITEM)
            .with_force_close_parent(&menu),
    );
    submenu.set_open(true);
    println!("submenu ancestors: {:?}", stack.ancestor_path(&submenu));
    assert!(stack.add(&submenu).is_empty());
    stack.commit();

    let tip: OverlayRc<u32> = shown(TIP, OverlayKind::Hint, SUBMENU_ITEM);
    assert!(stack.add(&tip).is_empty());
    stack.commit();
    println!("stack: {:?}", stack.nodes().collect::<Vec<_>>());

    // Escape closes exactly one overlay per press.
    assert_eq!(stack.handle_key_down(Key::Escape), Some(TIP));
    assert!(!tip.is_open());

    // A click inside the submenu keeps the whole chain open.
    assert!(stack.handle_pointer_up_at(SUBMENU_ITEM).is_empty());

    // A click elsewhere closes submenu and menu, topmost first.
    let closed = stack.handle_pointer_up_at(ELSEWHERE);
    println!("pointer-up elsewhere closed {closed:?}");
    assert_eq!(closed, vec![SUBMENU, MENU]);
    assert!(stack.is_empty());

    // Manual overlays are left alone when a modal opens.
    let toast: OverlayRc<u32> = shown(TOAST, OverlayKind::Manual, ROOT);
    stack.add(&toast);
    let dialog: OverlayRc<u32> = shown(DIALOG, OverlayKind::Modal, BUTTON);
    assert!(stack.add(&dialog).is_empty());
    stack.commit();
    assert_eq!(stack.nodes().collect::<Vec<_>>(), vec![TOAST, DIALOG]);
    assert_eq!(stack.handle_key_down(Key::Escape), Some(DIALOG));
    assert!(toast.is_open());
    println!("remaining: {:?}", stack.nodes().collect::<Vec<_>>());
}
