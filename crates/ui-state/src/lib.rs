//! UI state machine for the indoor map overlay
//!
//! This crate owns the view-state tree rendered by the overlay widgets, the
//! transitions between the default, search, direction-search and direction
//! modes, and the dispatcher that is the only writer to the map surface.
//!
//! Every transition produces a new snapshot and hands the (old, new) pair to
//! a render callback. Asynchronous lookups carry generation tokens so that a
//! response superseded by a later event is dropped instead of applied.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod content;
pub mod dispatcher;
pub mod error;
pub mod formatter;
pub mod interceptor;
pub mod options;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod surface;
pub mod transitions;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use content::{ButtonAction, ButtonContent, RowContent, RowData};
pub use dispatcher::{ErrorReporter, MapActionsDispatcher};
pub use error::{Result, UiError};
pub use interceptor::{CallbackInterceptor, DefaultInterceptor};
pub use options::{UiOptions, Unit};
pub use scheduler::{DeferredKey, Scheduler};
pub use state::{RenderFn, UiState, UiStatus};
pub use store::{StoreContext, UiControllerStore};
pub use surface::{
    Camera, CameraTarget, DirectionOptions, DirectionOverlay, FollowUserMode, MapSurface, Marker,
    NavigationInfo, NavigationRequest,
};
