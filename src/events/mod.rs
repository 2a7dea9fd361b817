//! Runtime events: types and broadcast bus.
//!
//! The supervisor and its worker tasks describe what they are doing by
//! publishing [`Event`]s on a [`Bus`]. A single listener inside the supervisor
//! forwards them to the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
