// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `JointSpace` Lib - A shared liveness broker for Philips jointSPACE televisions.
//!
//! A jointSPACE television is a slow, unauthenticated HTTP peer that can
//! disappear at any moment and never reports its own state. This library lets
//! many independent consumers share one such device safely:
//!
//! - **Liveness probing**: a background task pings the television on a fixed
//!   interval and keeps a tri-state [`Liveness`] value
//! - **Fan-out**: every attached consumer is told about each transition
//!   exactly once
//! - **Gated dispatch**: commands only reach the device while it is live;
//!   otherwise they resolve to a deterministic "unavailable" payload
//! - **Shared API handle**: one [`DeviceApi`](api::DeviceApi) per session,
//!   shared by all consumers
//!
//! # Channel Kinds
//!
//! | Kind | Operations |
//! |------|------------|
//! | read | sources, current source, system info and its attributes |
//! | write | set current source |
//! | power | on, get |
//! | key | send a remote-control key |
//!
//! # Quick Start
//!
//! ```no_run
//! use jointspace_lib::api::JointSpaceClient;
//! use jointspace_lib::{Channel, ChannelKind, DeviceSession, Message, PingProbe, SessionConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> jointspace_lib::Result<()> {
//!     let config = SessionConfig::new("192.168.1.40");
//!     let api = JointSpaceClient::new(&config)?;
//!     let session = DeviceSession::start(config, api, PingProbe::new())?;
//!
//!     // Power channels push {"topic": "on", "payload": <bool>} on every transition
//!     let (power, mut outbox) = Channel::attach(&session, ChannelKind::Power);
//!     tokio::spawn(async move {
//!         while let Some(msg) = outbox.recv().await {
//!             println!("{} = {}", msg.topic, msg.payload);
//!         }
//!     });
//!
//!     let (read, _) = Channel::attach(&session, ChannelKind::Read);
//!     if let Some(reply) = read.input(Message::new("tv/currentsource", json!(null))).await {
//!         println!("current source: {}", reply.payload);
//!     }
//!
//!     power.close(true);
//!     session.shutdown();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod command;
mod config;
pub mod dispatch;
pub mod error;
pub mod liveness;
pub mod registry;
mod session;

pub use command::{ChannelKind, Command, ReadOperation, RemoteKey};
pub use config::{SessionConfig, SessionSettings};
pub use dispatch::{Dispatcher, Message, Outcome};
pub use error::{ApiError, CommandError, ConfigError, Error, ProbeError, Result};
pub use liveness::{Liveness, PingProbe, Reachability, ReachabilityProbe};
pub use registry::ConsumerId;
pub use session::{Channel, ChannelStatus, DeviceSession, OUTBOX_CAPACITY, POWER_TOPIC};
