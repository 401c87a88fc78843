// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device liveness tracking.
//!
//! The jointSPACE API has no push notifications, so the only way to know
//! whether the television is on is to ask the network. This module provides:
//!
//! - [`Liveness`] - the tri-state value owned by a session
//! - [`Reachability`] - the boolean outcome of one probe
//! - [`ReachabilityProbe`] - the probing capability, with [`PingProbe`] as the
//!   platform implementation
//!
//! A session runs the probe on a fixed interval and applies
//! [`Liveness::transition`] to every observation. Only real transitions are
//! fanned out to consumers.

mod probe;
pub(crate) mod prober;
mod state;

pub use probe::{PingProbe, ReachabilityProbe};
pub use state::{Liveness, Reachability};
