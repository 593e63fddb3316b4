// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Description-reference bookkeeping for the longpress affordance.
//!
//! A trigger with longpress content attaches one hidden descriptor element to its anchor
//! and references it from the anchor's description list. Other tokens in that list belong
//! to the host and keep their order.
//!
//! ```
//! use understory_trigger::describedby::DescribedBy;
//!
//! let mut refs = DescribedBy::parse("help  label");
//! assert!(refs.insert("longpress"));
//! assert_eq!(refs.to_string(), "help label longpress");
//! assert!(refs.remove("longpress"));
//! assert_eq!(refs.to_string(), "help label");
//! ```

use core::fmt;

use crate::types::LongpressSource;

/// An ordered, whitespace-separated list of element ids.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DescribedBy {
    tokens: Vec<String>,
}

impl DescribedBy {
    /// Parse an attribute value. Runs of whitespace separate tokens.
    pub fn parse(value: &str) -> Self {
        Self {
            tokens: value.split_whitespace().map(String::from).collect(),
        }
    }

    /// Tokens in order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Whether `token` is present.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Append `token` unless already present. Returns whether the list changed.
    pub fn insert(&mut self, token: &str) -> bool {
        if self.contains(token) {
            return false;
        }
        self.tokens.push(token.to_owned());
        true
    }

    /// Remove one occurrence of `token`. Returns whether the list changed.
    pub fn remove(&mut self, token: &str) -> bool {
        match self.tokens.iter().position(|t| t == token) {
            Some(i) => {
                self.tokens.remove(i);
                true
            }
            None => false,
        }
    }

    /// Whether the list has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for DescribedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

/// The hidden element that tells assistive technology about the longpress affordance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LongpressDescriptor {
    /// Element id referenced from the anchor's description list.
    pub id: String,
}

impl LongpressDescriptor {
    /// Instruction text for the device the user is most likely operating.
    pub fn message(&self, source: LongpressSource) -> &'static str {
        match source {
            LongpressSource::Touch => "Double tap and long press for additional options",
            LongpressSource::Keyboard => "Press Space or Alt+Down Arrow for additional options",
            LongpressSource::Pointer => "Click and hold for additional options",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_existing_order() {
        let mut refs = DescribedBy::parse("a b c");
        assert!(refs.insert("d"));
        assert!(!refs.insert("b"));
        assert_eq!(refs.tokens().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn remove_takes_exactly_one_token() {
        let mut refs = DescribedBy::parse("a x b x");
        assert!(refs.remove("x"));
        assert_eq!(refs.to_string(), "a b x");
        assert!(!refs.remove("missing"));
        assert_eq!(refs.to_string(), "a b x");
    }

    #[test]
    fn empty_value_round_trips() {
        let mut refs = DescribedBy::parse("   ");
        assert!(refs.is_empty());
        assert_eq!(refs.to_string(), "");
        refs.insert("only");
        assert_eq!(refs.to_string(), "only");
        refs.remove("only");
        assert!(refs.is_empty());
    }

    #[test]
    fn descriptor_messages_differ_per_device() {
        let d = LongpressDescriptor { id: "lp".into() };
        assert_ne!(
            d.message(LongpressSource::Touch),
            d.message(LongpressSource::Keyboard)
        );
        assert!(d.message(LongpressSource::Pointer).contains("hold"));
    }
}
