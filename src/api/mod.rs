// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device API surface.
//!
//! The session never talks HTTP itself. It holds one [`DeviceApi`]
//! implementation, shared read-only by every consumer, and calls it only when
//! the device is known to be reachable.
//!
//! With the `http` feature (enabled by default), [`JointSpaceClient`] provides
//! the jointSPACE REST implementation.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::JointSpaceClient;

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::command::RemoteKey;
use crate::error::ApiError;

/// One of the scalar system attributes exposed under `system/<attribute>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemAttribute {
    /// Configured country.
    Country,
    /// Device name.
    Name,
    /// On-screen menu language.
    MenuLanguage,
    /// Model identifier.
    Model,
    /// Serial number.
    SerialNumber,
    /// Firmware version.
    SoftwareVersion,
}

impl SystemAttribute {
    /// All attributes, in the order they appear in the API.
    pub const ALL: [SystemAttribute; 6] = [
        Self::Country,
        Self::Name,
        Self::MenuLanguage,
        Self::Model,
        Self::SerialNumber,
        Self::SoftwareVersion,
    ];

    /// Returns the path segment and the JSON field name, which are identical.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Name => "name",
            Self::MenuLanguage => "menulanguage",
            Self::Model => "model",
            Self::SerialNumber => "serialnumber",
            Self::SoftwareVersion => "softwareversion",
        }
    }

    /// Returns the JSON field holding the attribute value in the response.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for SystemAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations offered by the television's control endpoint.
///
/// Implementations must be safe for concurrent calls from any number of
/// tasks. Each method makes one request; retries are up to the
/// implementation. Results are the raw JSON bodies.
pub trait DeviceApi: Send + Sync + 'static {
    /// Lists the available input sources.
    fn sources(&self) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Returns the currently selected source, e.g. `{"id": "hdmi1"}`.
    fn current_source(&self) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Returns the full system information object.
    fn system(&self) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Returns a single system attribute, e.g. `{"country": "DK"}`.
    fn system_attribute(
        &self,
        attribute: SystemAttribute,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Selects an input source.
    fn set_current_source(
        &self,
        source_id: &str,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// Sends one remote-control key press.
    fn send_key(&self, key: RemoteKey) -> impl Future<Output = Result<Value, ApiError>> + Send;
}
