//! # Event subscribers.
//!
//! A subscriber observes the [`Event`](crate::Event)s published by the
//! supervisor and its worker tasks. Each one runs in its own worker task fed
//! by a bounded queue, so a slow subscriber never delays shutdown.
//!
//! ```text
//! Bus ──► Supervisor listener ──► SubscriberSet::emit(&Event)
//!                                   ├──► [queue S1] ─► S1.on_event()
//!                                   └──► [queue SN] ─► SN.on_event()
//! ```
//!
//! - [`Subscribe`] extension point
//! - [`SubscriberSet`] non-blocking fan-out
//! - [`LogWriter`] renders events through `tracing`

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
