// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A button with a tooltip, a click menu, and a longpress menu.
//!
//! The opener registers every surface with a shared [`OverlayStack`]; the host routes
//! global pointer-up and Escape to the stack and reports closures back to the trigger.
//!
//! Run:
//! - `cargo run -p understory_demos --example trigger_menu`

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::executor::LocalPool;
use kurbo::Vec2;
use understory_overlay::stack::OverlayStack;
use understory_overlay::types::{Key, Overlay, OverlayKind, OverlayRc, SimpleOverlay};
use understory_trigger::opener::{Disposer, OpenFuture, OpenRequest};
use understory_trigger::{LongpressSource, OpenMode, Placement, Slot, Trigger, TriggerOptions};

const ROOT: u32 = 0;
const BUTTON: u32 = 1;
const ELSEWHERE: u32 = 5;
const MENU: u32 = 10;
const MENU_ITEM: u32 = 11;
const TIP: u32 = 20;
const ACTIONS: u32 = 30;

type Parents = fn(&u32) -> Option<u32>;
type Stack = Rc<RefCell<OverlayStack<u32, Parents>>>;

fn parent_of(node: &u32) -> Option<u32> {
    match *node {
        MENU_ITEM => Some(MENU),
        ROOT => None,
        _ => Some(ROOT),
    }
}

fn opener(stack: Stack) -> impl Fn(OpenRequest<u32>) -> OpenFuture {
    move |req: OpenRequest<u32>| -> OpenFuture {
        let stack = stack.clone();
        async move {
            let kind = match req.slot {
                Slot::Hover => OverlayKind::Hint,
                Slot::Click | Slot::Longpress => OverlayKind::Auto,
            };
            let overlay: OverlayRc<u32> =
                Rc::new(SimpleOverlay::new(req.content, kind).with_trigger(req.trigger));
            overlay.set_open(true);
            println!(
                "show {:?} at {:?} offset {:?}",
                req.content, req.options.placement, req.options.offset
            );
            stack.borrow_mut().add(&overlay);
            stack.borrow_mut().commit();
            Ok(Disposer::new(move || {
                println!("hide {:?}", overlay.node());
                stack.borrow_mut().remove(&overlay);
            }))
        }
        .boxed_local()
    }
}

/// Tell the trigger about surfaces the stack closed on its own.
fn report(trigger: &Trigger<u32>, closed: &[u32]) {
    for node in closed {
        let slot = match *node {
            MENU => Slot::Click,
            TIP => Slot::Hover,
            ACTIONS => Slot::Longpress,
            _ => continue,
        };
        trigger.surface_closed(slot);
    }
}

fn main() {
    let mut pool = LocalPool::new();
    let stack: Stack = Rc::new(RefCell::new(OverlayStack::with_containment(
        parent_of as Parents,
    )));
    let options = TriggerOptions {
        placement: Placement::BottomStart,
        offset: Vec2::new(4.0, 0.0),
        ..TriggerOptions::default()
    };
    let trigger = Trigger::with_options(
        BUTTON,
        opener(stack.clone()),
        pool.spawner(),
        parent_of as Parents,
        options,
    );
    trigger.set_content(Slot::Hover, Some(TIP));
    trigger.set_content(Slot::Click, Some(MENU));
    trigger.set_content(Slot::Longpress, Some(ACTIONS));
    trigger.set_described_by("button-label");
    println!("aria-describedby: {}", trigger.described_by());
    if let Some(descriptor) = trigger.longpress_descriptor() {
        println!("{}: {}", descriptor.id, descriptor.message(LongpressSource::Touch));
    }

    // Hover shows the tooltip.
    trigger.pointer_enter();
    pool.run_until(trigger.settled());
    assert_eq!(stack.borrow().top(), Some(TIP));

    // Clicking swaps the tooltip for the menu.
    trigger.activate();
    pool.run_until(trigger.settled());
    assert_eq!(stack.borrow().nodes().collect::<Vec<_>>(), vec![MENU]);

    // Pointer-up inside the menu keeps it; elsewhere dismisses it.
    let closed = stack.borrow_mut().handle_pointer_up_at(MENU_ITEM);
    assert!(closed.is_empty());
    let closed = stack.borrow_mut().handle_pointer_up_at(ELSEWHERE);
    report(&trigger, &closed);
    assert_eq!(closed, vec![MENU]);
    assert_eq!(trigger.open_mode(), OpenMode::None);

    // Long-press opens the action menu; Escape closes it.
    trigger.longpress(LongpressSource::Touch);
    pool.run_until(trigger.settled());
    assert_eq!(stack.borrow().top(), Some(ACTIONS));
    let closed: Vec<u32> = stack
        .borrow_mut()
        .handle_key_down(Key::Escape)
        .into_iter()
        .collect();
    report(&trigger, &closed);
    assert_eq!(trigger.open_mode(), OpenMode::None);
    assert!(stack.borrow().is_empty());
    println!("done");
}
