// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical ancestor paths across overlay surfaces.
//!
//! Overlay surfaces usually live outside their anchor's physical subtree (for example in a
//! top layer), so plain containment cannot tell that a submenu belongs to its parent menu.
//! The logical path bridges that gap: whenever the walk reaches the root node of an overlay
//! surface, it continues at that overlay's trigger element instead of the physical parent.
//!
//! ```
//! use understory_overlay::path::ancestor_path;
//!
//! // 1 ← 2 (anchor) ; surface 10 is triggered by 2 ; 11 sits inside 10.
//! let parents = |n: &u32| match *n {
//!     2 => Some(1),
//!     11 => Some(10),
//!     _ => None,
//! };
//! let surface_trigger = |n: &u32| (*n == 10).then_some(2);
//! assert_eq!(ancestor_path(11, &parents, surface_trigger), vec![1, 2, 10, 11]);
//! ```

use alloc::vec::Vec;

use crate::types::ContainmentLookup;

/// Build the root→`start` logical path.
///
/// `surface_trigger` maps the root node of an overlay surface to that overlay's trigger element;
/// it is consulted before `containment` so that surfaces hang off their anchors.
/// The walk stops at the first repeated node, so cyclic host data terminates.
pub fn ancestor_path<K, C, T>(start: K, containment: &C, surface_trigger: T) -> Vec<K>
where
    K: Copy + Eq,
    C: ContainmentLookup<K> + ?Sized,
    T: Fn(&K) -> Option<K>,
{
    let mut out = Vec::new();
    let mut cur = start;
    loop {
        out.push(cur);
        let next = surface_trigger(&cur).or_else(|| containment.parent_of(&cur));
        match next {
            Some(p) if !out.contains(&p) => cur = p,
            _ => break,
        }
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NoContainment;
    use alloc::vec;

    fn parents(n: &u32) -> Option<u32> {
        match *n {
            3 => Some(2),
            2 => Some(1),
            21 => Some(20),
            _ => None,
        }
    }

    #[test]
    fn plain_containment_is_root_to_target() {
        assert_eq!(ancestor_path(3, &parents, |_| None), vec![1, 2, 3]);
    }

    #[test]
    fn singleton_without_containment() {
        assert_eq!(ancestor_path(9_u32, &NoContainment, |_| None), vec![9]);
    }

    #[test]
    fn surface_root_hops_to_trigger() {
        // Surface 20 is anchored at node 3.
        let path = ancestor_path(21, &parents, |n: &u32| (*n == 20).then_some(3));
        assert_eq!(path, vec![1, 2, 3, 20, 21]);
    }

    #[test]
    fn trigger_link_wins_over_physical_parent() {
        // Surface 2 is physically under 1, but logically anchored at 7.
        let path = ancestor_path(3, &parents, |n: &u32| (*n == 2).then_some(7));
        assert_eq!(path, vec![7, 2, 3]);
    }

    #[test]
    fn cycles_terminate() {
        let cyclic = |n: &u32| Some(if *n == 1 { 2 } else { 1 });
        assert_eq!(ancestor_path(1, &cyclic, |_| None), vec![2, 1]);
    }
}
