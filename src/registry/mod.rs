// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer registration.
//!
//! Every consumer attached to a session is keyed by a [`ConsumerId`] and
//! carries a [`LivenessCallback`]. The registry is owned by the session; the
//! session's `register`, `deregister` and `remove` are its only mutators.

mod consumer_id;
mod consumer_registry;

pub use consumer_id::ConsumerId;
pub(crate) use consumer_registry::ConsumerRegistry;
pub use consumer_registry::LivenessCallback;
