// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer identity.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

const PREFIX: &str = "consumer-";

/// Stable identity of a consumer attached to a device session.
///
/// The textual form is `consumer-<32 hex digits>`. A host that restarts a
/// consumer should persist that text and parse it back, so the
/// re-registration overwrites the previous entry instead of adding one.
///
/// # Examples
///
/// ```
/// use jointspace_lib::ConsumerId;
///
/// let id = ConsumerId::new();
/// let text = id.to_string();
/// assert!(text.starts_with("consumer-"));
/// assert_eq!(text.parse::<ConsumerId>().unwrap(), id);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConsumerId(Uuid);

impl ConsumerId {
    /// Creates a new unique consumer identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConsumerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.0.simple())
    }
}

// Log fields use Display; Debug keeps struct dumps short.
impl fmt::Debug for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.0.simple().to_string();
        f.debug_tuple("ConsumerId").field(&&hex[..8]).finish()
    }
}

impl FromStr for ConsumerId {
    type Err = uuid::Error;

    /// Parses `consumer-<hex>`. The prefix is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix(PREFIX).unwrap_or(s);
        Uuid::parse_str(hex).map(Self)
    }
}
