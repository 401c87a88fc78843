// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device session configuration.
//!
//! [`SessionConfig`] is the validated, builder-style configuration used to
//! start a [`DeviceSession`](crate::DeviceSession). [`SessionSettings`] is its
//! serde-friendly counterpart for loading from files, with millisecond fields
//! and defaults.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Configuration for one jointSPACE device.
///
/// # Examples
///
/// ```
/// use jointspace_lib::SessionConfig;
/// use std::time::Duration;
///
/// let config = SessionConfig::new("192.168.1.40")
///     .with_request_timeout(Duration::from_secs(2));
///
/// assert_eq!(config.base_url(), "http://192.168.1.40:1925/1");
/// assert_eq!(config.ping_interval(), Duration::from_millis(3000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    host: String,
    port: u16,
    api_version: u8,
    request_timeout: Duration,
    ping_interval: Duration,
    probe_timeout: Duration,
}

impl SessionConfig {
    /// Default jointSPACE port.
    pub const DEFAULT_PORT: u16 = 1925;
    /// Default jointSPACE API version.
    pub const DEFAULT_API_VERSION: u8 = 1;
    /// Default device API request timeout.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
    /// Default interval between reachability probes.
    pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_millis(3000);
    /// Default bound on a single reachability probe.
    pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration for the given host with default settings.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            api_version: Self::DEFAULT_API_VERSION,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            ping_interval: Self::DEFAULT_PING_INTERVAL,
            probe_timeout: Self::DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the jointSPACE API version used in request paths.
    #[must_use]
    pub fn with_api_version(mut self, version: u8) -> Self {
        self.api_version = version;
        self
    }

    /// Sets the device API request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the reachability probe interval.
    #[must_use]
    pub fn with_ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = interval;
        self
    }

    /// Sets the bound on a single reachability probe.
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Returns the device host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the API version.
    #[must_use]
    pub fn api_version(&self) -> u8 {
        self.api_version
    }

    /// Returns the device API request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the probe interval.
    #[must_use]
    pub fn ping_interval(&self) -> Duration {
        self.ping_interval
    }

    /// Returns the probe timeout.
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Builds the versioned API base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/{}", self.host, self.port, self.api_version)
    }

    /// Checks that the configuration can be used to start a session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the host is empty, the port is zero, or any
    /// interval or timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroInterval("request timeout"));
        }
        if self.ping_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("ping interval"));
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroInterval("probe timeout"));
        }
        Ok(())
    }
}

/// Serializable session settings, as stored in a host configuration file.
///
/// # Examples
///
/// ```
/// use jointspace_lib::{SessionConfig, SessionSettings};
///
/// let settings: SessionSettings =
///     serde_json::from_str(r#"{ "host": "tv.local", "timeout_ms": 2000 }"#).unwrap();
/// let config = SessionConfig::try_from(settings).unwrap();
///
/// assert_eq!(config.host(), "tv.local");
/// assert_eq!(config.port(), 1925);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSettings {
    /// Device hostname or IP address.
    #[serde(default)]
    pub host: String,
    /// jointSPACE port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// jointSPACE API version.
    #[serde(default = "default_api_version")]
    pub api_version: u8,
    /// Device API request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Probe interval in milliseconds.
    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,
    /// Probe bound in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_port() -> u16 {
    SessionConfig::DEFAULT_PORT
}

fn default_api_version() -> u8 {
    SessionConfig::DEFAULT_API_VERSION
}

fn default_timeout_ms() -> u64 {
    millis(SessionConfig::DEFAULT_REQUEST_TIMEOUT)
}

fn default_ping_interval_ms() -> u64 {
    millis(SessionConfig::DEFAULT_PING_INTERVAL)
}

fn default_probe_timeout_ms() -> u64 {
    millis(SessionConfig::DEFAULT_PROBE_TIMEOUT)
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl TryFrom<SessionSettings> for SessionConfig {
    type Error = ConfigError;

    fn try_from(settings: SessionSettings) -> Result<Self, Self::Error> {
        let config = SessionConfig::new(settings.host)
            .with_port(settings.port)
            .with_api_version(settings.api_version)
            .with_request_timeout(Duration::from_millis(settings.timeout_ms))
            .with_ping_interval(Duration::from_millis(settings.ping_interval_ms))
            .with_probe_timeout(Duration::from_millis(settings.probe_timeout_ms));
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = SessionConfig::new("192.168.1.40");
        assert_eq!(config.host(), "192.168.1.40");
        assert_eq!(config.port(), 1925);
        assert_eq!(config.api_version(), 1);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.ping_interval(), Duration::from_secs(3));
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn millis_truncates_and_saturates() {
        assert_eq!(millis(Duration::from_micros(2_999)), 2);
        assert_eq!(millis(Duration::from_secs(3)), 3_000);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn base_url_uses_port_and_version() {
        let config = SessionConfig::new("tv.local")
            .with_port(8080)
            .with_api_version(6);
        assert_eq!(config.base_url(), "http://tv.local:8080/6");
    }

    #[test]
    fn validate_rejects_empty_host() {
        let config = SessionConfig::new("  ");
        assert_eq!(config.validate(), Err(ConfigError::MissingHost));
    }

    #[test]
    fn validate_rejects_zero_port() {
        let config = SessionConfig::new("tv.local").with_port(0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidPort(0)));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let config = SessionConfig::new("tv.local").with_ping_interval(Duration::ZERO);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroInterval("ping interval"))
        );
    }

    #[test]
    fn settings_apply_defaults() {
        let settings: SessionSettings = serde_json::from_str(r#"{ "host": "tv.local" }"#).unwrap();
        let config = SessionConfig::try_from(settings).unwrap();
        assert_eq!(config, SessionConfig::new("tv.local"));
    }

    #[test]
    fn settings_override_timings() {
        let settings: SessionSettings = serde_json::from_str(
            r#"{ "host": "tv.local", "timeout_ms": 1500, "ping_interval_ms": 1000 }"#,
        )
        .unwrap();
        let config = SessionConfig::try_from(settings).unwrap();
        assert_eq!(config.request_timeout(), Duration::from_millis(1500));
        assert_eq!(config.ping_interval(), Duration::from_secs(1));
    }

    #[test]
    fn settings_without_host_fail() {
        let settings: SessionSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(
            SessionConfig::try_from(settings),
            Err(ConfigError::MissingHost)
        );
    }
}
