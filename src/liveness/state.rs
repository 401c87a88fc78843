// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tri-state liveness and the probe-observation transition table.

use std::fmt;

/// Whether the device currently answers reachability probes.
///
/// A session starts in [`Liveness::Unknown`] and leaves it on the first probe
/// result. Only the prober changes it.
///
/// # Examples
///
/// ```
/// use jointspace_lib::{Liveness, Reachability};
///
/// let state = Liveness::Unknown;
/// assert_eq!(state.transition(Reachability::Unreachable), Some(Liveness::Off));
/// assert_eq!(Liveness::Off.transition(Reachability::Unreachable), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Liveness {
    /// No probe has completed yet.
    #[default]
    Unknown,
    /// The last probe reached the device.
    On,
    /// The last probe did not reach the device.
    Off,
}

impl Liveness {
    /// Returns `true` only when the device is known to be reachable.
    ///
    /// `Unknown` counts as not ready.
    #[must_use]
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    /// Returns the state that follows an observation, or `None` when the
    /// observation repeats the current state.
    #[must_use]
    pub const fn transition(self, observed: Reachability) -> Option<Self> {
        match (observed, self) {
            (Reachability::Reachable, Self::On) | (Reachability::Unreachable, Self::Off) => None,
            (Reachability::Reachable, _) => Some(Self::On),
            (Reachability::Unreachable, _) => Some(Self::Off),
        }
    }

    /// Returns a short display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reachability {
    /// The probe exited with status 0.
    Reachable,
    /// The probe failed, timed out, or could not be launched.
    Unreachable,
}

impl From<bool> for Reachability {
    fn from(reachable: bool) -> Self {
        if reachable {
            Self::Reachable
        } else {
            Self::Unreachable
        }
    }
}
