//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - Discovery feeds (candidate token addresses)
//! - Detail lookups (market snapshots per address batch)
//! - Output persistence (the run's JSON document)
//! - Notifications (forwarding addresses to a chat)
//! - Time (wall clock, monotonic clock, sleeping)
//!
//! The pipeline only talks to these traits, so it runs in tests with
//! injected fetch results and no network I/O.

pub mod clock;
pub mod discovery;
pub mod notifier;
pub mod sink;

pub use clock::{Clock, SystemClock};
pub use discovery::{DetailPort, DiscoveryPort, SourceError};
pub use notifier::{Notifier, NotifyError};
pub use sink::{DocumentReader, OutputSink, SinkError};

#[cfg(test)]
pub use discovery::{MockDetailPort, MockDiscoveryPort};
#[cfg(test)]
pub use notifier::MockNotifier;
#[cfg(test)]
pub use sink::MockOutputSink;
