// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command dispatch.
//!
//! A [`Dispatcher`] turns a validated [`Command`](crate::Command) into exactly
//! one [`Outcome`]:
//!
//! 1. snapshot the session liveness;
//! 2. if the device is not live, return [`Outcome::Unavailable`] without
//!    contacting it (`null` for reads, `false` otherwise);
//! 3. otherwise call the device API under the request timeout;
//! 4. map the result, extracting optional fields as `null` when absent.
//!
//! Power commands have their own rules: requesting "on" while the device is
//! off reports `false` because there is no way to wake it over the network,
//! and requesting "off" while it is on sends the `Standby` key.

mod dispatcher;
mod outcome;

pub use dispatcher::Dispatcher;
pub use outcome::{Message, Outcome};
