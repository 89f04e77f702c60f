//! Concurrent liveness probing.
//!
//! - [`resolver`]: host to dialable address
//! - [`dialer`]: per-transport connection strategies
//! - [`prober`]: a single timed probe
//! - [`coordinator`]: fan-out of one probe task per peer with a join barrier

pub mod coordinator;
pub mod dialer;
pub mod prober;
pub mod resolver;

pub use coordinator::probe_all;
pub use dialer::{Connection, Dialer, TransportDialer};
pub use prober::Prober;
pub use resolver::{resolve, Resolver, SystemResolver};
