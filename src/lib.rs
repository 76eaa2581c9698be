//! Indoor map UI overlay
//!
//! Ties the data service, the map surface and the UI state machine together
//! behind a single `UiController`. Hosts feed it map events, widget events
//! and commands, either directly or through an event channel, and render
//! the snapshots it produces.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod controller;
pub mod events;
pub mod logging;

pub use controller::UiController;
pub use events::{ControllerEvent, HostCommand, MapClick, MapEvent, UiEvent};

pub use map_api;
pub use ui_state;
