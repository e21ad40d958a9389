//! Sonar - an ICMP echo ("ping") client library.
//!
//! This crate provides an event-driven engine for probing the liveness of a
//! single host. Given a host name (or literal IP address) the engine
//! resolves it to an address of a policy-selected family, opens an ICMP
//! datagram socket of the matching family, sends one echo request per
//! explicit [`Pinger::send_ping`] call and correlates inbound echo replies
//! back to the session by identifier, sequence number, type, code and (for
//! IPv4) checksum. Everything that happens is published to a
//! consumer-supplied sink as a [`PingEvent`].
//!
//! The engine reacts rather than polls: it performs work only inside its
//! public operations, and a driver supplies both the sending cadence and
//! the [`Pinger::poll`] ticks that dispatch resolver completions and socket
//! readability. Per-packet timeouts and round-trip statistics are driver
//! concerns; [`RttTracker`] provides the sequence-to-send-time bookkeeping
//! they need.
//!
//! # Example
//!
//! The following example pings a host once a second and prints round-trip
//! times:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use sonar_core::{Builder, PingEvent, PingerState, RttTracker};
//! use std::cell::RefCell;
//! use std::time::Duration;
//!
//! let tracker = RefCell::new(RttTracker::new());
//! let mut pinger = Builder::new("example.com").build(|event| match event {
//!     PingEvent::Started { addr } => println!("pinging {addr}"),
//!     PingEvent::Sent { sequence, .. } => tracker.borrow_mut().record_sent(*sequence),
//!     PingEvent::Received { sequence, .. } => {
//!         if let Some(rtt) = tracker.borrow_mut().record_received(*sequence) {
//!             println!("reply #{sequence} after {rtt:?}");
//!         }
//!     }
//!     event => println!("{event:?}"),
//! })?;
//! pinger.start();
//! while pinger.state() == PingerState::Resolving {
//!     pinger.poll();
//! }
//! while pinger.state() == PingerState::Active {
//!     pinger.send_ping(None);
//!     for _ in 0..100 {
//!         pinger.poll();
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Pinger`].
//! - [`Pinger`] - A single ping session.
//! - [`PingEvent`] - The events a session publishes.
#![warn(clippy::all, clippy::pedantic, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]
#![deny(unsafe_code)]

mod builder;
mod config;
mod constants;
mod error;
mod event;
mod net;
mod pinger;
mod tracker;
mod types;

pub use builder::Builder;
pub use config::{defaults, Config};
pub use constants::{DEFAULT_PAYLOAD, MAX_PACKET_SIZE, SEQUENCE_WINDOW};
pub use error::{Error, IoError, IoOperation, PingResult};
pub use event::PingEvent;
pub use net::channel::PingChannel;
pub use net::platform::SocketImpl;
pub use net::socket::Socket;
pub use pinger::{Pinger, PingerState};
pub use sonar_dns::IpAddrFamily;
pub use tracker::RttTracker;
pub use types::{PingIdentifier, Sequence};
