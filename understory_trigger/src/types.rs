// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slots, open modes, gesture sources, and per-trigger options.

use kurbo::Vec2;

/// One of a trigger's candidate content kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Slot {
    /// Content shown on primary activation.
    Click,
    /// Content shown while the pointer or focus is on the anchor.
    Hover,
    /// Content shown after a long-press gesture.
    Longpress,
}

impl Slot {
    /// All slots, in closing order.
    pub const ALL: [Self; 3] = [Self::Click, Self::Hover, Self::Longpress];

    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Click => 0,
            Self::Hover => 1,
            Self::Longpress => 2,
        }
    }

    /// The single-slot mask for this slot.
    pub const fn mask(self) -> Slots {
        match self {
            Self::Click => Slots::CLICK,
            Self::Hover => Slots::HOVER,
            Self::Longpress => Slots::LONGPRESS,
        }
    }
}

bitflags::bitflags! {
    /// A set of slots.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Slots: u8 {
        /// The click slot.
        const CLICK     = 0b0000_0001;
        /// The hover slot.
        const HOVER     = 0b0000_0010;
        /// The longpress slot.
        const LONGPRESS = 0b0000_0100;
    }
}

impl Slots {
    /// Iterate the contained slots in closing order.
    pub fn slots(self) -> impl Iterator<Item = Slot> {
        Slot::ALL.into_iter().filter(move |s| self.contains(s.mask()))
    }
}

/// Which slot a trigger currently requests open. Slots are mutually exclusive.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OpenMode {
    /// Nothing is requested open.
    #[default]
    None,
    /// The click slot.
    Click,
    /// The hover slot.
    Hover,
    /// The longpress slot.
    Longpress,
}

impl OpenMode {
    /// The slot requested by this mode.
    pub const fn slot(self) -> Option<Slot> {
        match self {
            Self::None => None,
            Self::Click => Some(Slot::Click),
            Self::Hover => Some(Slot::Hover),
            Self::Longpress => Some(Slot::Longpress),
        }
    }
}

impl From<Slot> for OpenMode {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Click => Self::Click,
            Slot::Hover => Self::Hover,
            Slot::Longpress => Self::Longpress,
        }
    }
}

/// Device that produced a classified long-press gesture.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LongpressSource {
    /// Touch and hold.
    Touch,
    /// Sustained mouse or pen press.
    Pointer,
    /// Keyboard shortcut (for example Space held, or Alt+Down Arrow).
    Keyboard,
}

/// Preferred side and alignment of a surface relative to its anchor.
///
/// Layout is the presentation layer's business; the trigger only forwards this.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Placement {
    /// Above, centered.
    Top,
    /// Above, start-aligned.
    TopStart,
    /// Above, end-aligned.
    TopEnd,
    /// Below, centered.
    #[default]
    Bottom,
    /// Below, start-aligned.
    BottomStart,
    /// Below, end-aligned.
    BottomEnd,
    /// Left, centered.
    Left,
    /// Left, start-aligned.
    LeftStart,
    /// Left, end-aligned.
    LeftEnd,
    /// Right, centered.
    Right,
    /// Right, start-aligned.
    RightStart,
    /// Right, end-aligned.
    RightEnd,
}

/// Where focus goes when a surface opens.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ReceivesFocus {
    /// The presentation layer decides based on the surface's kind.
    #[default]
    Auto,
    /// Focus the first focusable element inside the surface, or the surface itself if none.
    Always,
    /// Leave focus where it is.
    Never,
}

/// Per-trigger options forwarded to the surface opener.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerOptions {
    /// Preferred placement of every slot's surface.
    pub placement: Placement,
    /// Pixel offset of the surface from its anchor (main axis, cross axis).
    pub offset: Vec2,
    /// Focus behavior for click and hover surfaces. Longpress surfaces always take focus.
    pub receives_focus: ReceivesFocus,
    /// Element id of the longpress descriptor added to the anchor's description list.
    pub descriptor_id: String,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            placement: Placement::default(),
            offset: Vec2::new(6.0, 0.0),
            receives_focus: ReceivesFocus::default(),
            descriptor_id: String::from("longpress-describedby-descriptor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_mode_round_trips_slots() {
        for slot in Slot::ALL {
            assert_eq!(OpenMode::from(slot).slot(), Some(slot));
        }
        assert_eq!(OpenMode::None.slot(), None);
    }

    #[test]
    fn slots_iterate_in_closing_order() {
        let all: Vec<Slot> = Slots::all().slots().collect();
        assert_eq!(all, Slot::ALL.to_vec());
        let some: Vec<Slot> = (Slots::LONGPRESS | Slots::CLICK).slots().collect();
        assert_eq!(some, vec![Slot::Click, Slot::Longpress]);
        assert_eq!(Slots::empty().slots().count(), 0);
    }

    #[test]
    fn slot_indices_are_distinct() {
        let idx: Vec<usize> = Slot::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
