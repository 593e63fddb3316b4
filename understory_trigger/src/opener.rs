// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The surface opener contract consumed by triggers.
//!
//! The presentation layer supplies a [`SurfaceOpener`]. Given the anchor, the interaction
//! slot, the content element, and [`OpenOptions`], it shows the content (registering the
//! resulting surface with the overlay stack) and resolves to a [`Disposer`] that hides it.
//!
//! ```
//! use futures::FutureExt;
//! use understory_trigger::opener::{Disposer, OpenFuture, OpenRequest, SurfaceOpener};
//!
//! let opener = |req: OpenRequest<u32>| -> OpenFuture {
//!     let content = req.content;
//!     async move { Ok(Disposer::new(move || println!("hide {content}"))) }.boxed_local()
//! };
//! # fn assert_opener<O: SurfaceOpener<u32>>(_: &O) {}
//! # assert_opener(&opener);
//! ```

use core::fmt;

use futures::future::{AbortHandle, LocalBoxFuture};

use crate::types::{Placement, ReceivesFocus, Slot};
use kurbo::Vec2;

/// Why a surface did not open.
///
/// Triggers treat every failure as a silent no-op; the error only reaches the log.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// A competing interaction superseded the request before it completed.
    #[error("open request was aborted")]
    Aborted,
    /// The presentation layer declined to show the surface.
    #[error("surface for the {slot:?} slot could not be shown")]
    Rejected {
        /// Slot whose surface was rejected.
        slot: Slot,
    },
}

/// Result of a surface open operation.
pub type OpenFuture = LocalBoxFuture<'static, Result<Disposer, OpenError>>;

/// Shows surfaces on behalf of a trigger.
pub trait SurfaceOpener<K> {
    /// Start showing `request.content` for `request.trigger`.
    ///
    /// When [`OpenOptions::abort`] is set, the returned future may be dropped before it
    /// completes; implementations can poll the signal to skip work early.
    fn open(&self, request: OpenRequest<K>) -> OpenFuture;
}

impl<K, F: Fn(OpenRequest<K>) -> OpenFuture> SurfaceOpener<K> for F {
    fn open(&self, request: OpenRequest<K>) -> OpenFuture {
        self(request)
    }
}

/// Everything the opener needs to show one surface.
#[derive(Clone, Debug)]
pub struct OpenRequest<K> {
    /// The anchor element.
    pub trigger: K,
    /// The interaction that requested the surface.
    pub slot: Slot,
    /// The content element to show.
    pub content: K,
    /// Presentation options.
    pub options: OpenOptions,
}

/// Presentation options for one open request.
#[derive(Clone, Debug)]
pub struct OpenOptions {
    /// Preferred placement relative to the anchor.
    pub placement: Placement,
    /// Pixel offset from the anchor.
    pub offset: Vec2,
    /// Where focus goes once the surface is shown.
    pub receives_focus: ReceivesFocus,
    /// Cancellation channel; only hover requests carry one.
    pub abort: Option<AbortSignal>,
    /// The surface should ignore the input that opened it (for example the end of a
    /// touch-and-hold) instead of treating it as a dismissal.
    pub not_immediately_closable: bool,
}

/// Read-only view of a request's cancellation state.
#[derive(Clone)]
pub struct AbortSignal {
    handle: AbortHandle,
}

impl AbortSignal {
    pub(crate) fn new(handle: AbortHandle) -> Self {
        Self { handle }
    }

    /// Whether the request was superseded.
    pub fn is_aborted(&self) -> bool {
        self.handle.is_aborted()
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortSignal")
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// Hides a shown surface. Disposing twice is a no-op.
pub struct Disposer {
    hide: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("disposed", &self.hide.is_none())
            .finish()
    }
}

impl Disposer {
    /// Wrap the action that hides a surface.
    pub fn new(hide: impl FnOnce() + 'static) -> Self {
        Self {
            hide: Some(Box::new(hide)),
        }
    }

    /// A disposer with nothing to hide.
    pub fn noop() -> Self {
        Self { hide: None }
    }

    /// Hide the surface, once.
    pub fn dispose(&mut self) {
        if let Some(hide) = self.hide.take() {
            hide();
        }
    }

    /// Whether there is nothing left to hide.
    pub fn is_disposed(&self) -> bool {
        self.hide.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn disposer_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let mut d = Disposer::new(move || c.set(c.get() + 1));
        assert!(!d.is_disposed());
        d.dispose();
        d.dispose();
        assert_eq!(count.get(), 1);
        assert!(d.is_disposed());
    }

    #[test]
    fn noop_disposer_is_already_disposed() {
        let mut d = Disposer::noop();
        assert!(d.is_disposed());
        d.dispose();
    }

    #[test]
    fn abort_signal_tracks_handle() {
        let (handle, _registration) = AbortHandle::new_pair();
        let signal = AbortSignal::new(handle.clone());
        assert!(!signal.is_aborted());
        handle.abort();
        assert!(signal.is_aborted());
    }

    #[test]
    fn errors_format() {
        assert_eq!(OpenError::Aborted.to_string(), "open request was aborted");
        assert_eq!(
            OpenError::Rejected { slot: Slot::Hover }.to_string(),
            "surface for the Hover slot could not be shown"
        );
    }
}
