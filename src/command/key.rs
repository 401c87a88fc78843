// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote-control key vocabulary.

use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// A key accepted by the jointSPACE `input/key` endpoint.
///
/// Key names are matched case-sensitively, exactly as the television expects
/// them. [`RemoteKey::Standby`] is reserved for the power channel and is not
/// accepted from key channels.
///
/// # Examples
///
/// ```
/// use jointspace_lib::RemoteKey;
///
/// let key: RemoteKey = "VolumeUp".parse().unwrap();
/// assert_eq!(key, RemoteKey::VolumeUp);
/// assert_eq!(key.as_str(), "VolumeUp");
///
/// assert!("volumeup".parse::<RemoteKey>().is_err());
/// assert!("Standby".parse::<RemoteKey>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum RemoteKey {
    Back,
    Find,
    RedColour,
    GreenColour,
    YellowColour,
    BlueColour,
    Home,
    VolumeUp,
    VolumeDown,
    Mute,
    Options,
    Dot,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Info,
    CursorUp,
    CursorDown,
    CursorLeft,
    CursorRight,
    Confirm,
    Next,
    Previous,
    Adjust,
    WatchTV,
    Viewmode,
    Teletext,
    Subtitle,
    ChannelStepUp,
    ChannelStepDown,
    Source,
    AmbilightOnOff,
    PlayPause,
    Pause,
    FastForward,
    Stop,
    Rewind,
    Record,
    Online,
    /// Puts the television into standby. Power channel only.
    Standby,
}

impl RemoteKey {
    /// Keys a key channel may send.
    pub const VALID: [RemoteKey; 46] = [
        Self::Back,
        Self::Find,
        Self::RedColour,
        Self::GreenColour,
        Self::YellowColour,
        Self::BlueColour,
        Self::Home,
        Self::VolumeUp,
        Self::VolumeDown,
        Self::Mute,
        Self::Options,
        Self::Dot,
        Self::Digit0,
        Self::Digit1,
        Self::Digit2,
        Self::Digit3,
        Self::Digit4,
        Self::Digit5,
        Self::Digit6,
        Self::Digit7,
        Self::Digit8,
        Self::Digit9,
        Self::Info,
        Self::CursorUp,
        Self::CursorDown,
        Self::CursorLeft,
        Self::CursorRight,
        Self::Confirm,
        Self::Next,
        Self::Previous,
        Self::Adjust,
        Self::WatchTV,
        Self::Viewmode,
        Self::Teletext,
        Self::Subtitle,
        Self::ChannelStepUp,
        Self::ChannelStepDown,
        Self::Source,
        Self::AmbilightOnOff,
        Self::PlayPause,
        Self::Pause,
        Self::FastForward,
        Self::Stop,
        Self::Rewind,
        Self::Record,
        Self::Online,
    ];

    /// Returns the key name sent to the device.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Back => "Back",
            Self::Find => "Find",
            Self::RedColour => "RedColour",
            Self::GreenColour => "GreenColour",
            Self::YellowColour => "YellowColour",
            Self::BlueColour => "BlueColour",
            Self::Home => "Home",
            Self::VolumeUp => "VolumeUp",
            Self::VolumeDown => "VolumeDown",
            Self::Mute => "Mute",
            Self::Options => "Options",
            Self::Dot => "Dot",
            Self::Digit0 => "Digit0",
            Self::Digit1 => "Digit1",
            Self::Digit2 => "Digit2",
            Self::Digit3 => "Digit3",
            Self::Digit4 => "Digit4",
            Self::Digit5 => "Digit5",
            Self::Digit6 => "Digit6",
            Self::Digit7 => "Digit7",
            Self::Digit8 => "Digit8",
            Self::Digit9 => "Digit9",
            Self::Info => "Info",
            Self::CursorUp => "CursorUp",
            Self::CursorDown => "CursorDown",
            Self::CursorLeft => "CursorLeft",
            Self::CursorRight => "CursorRight",
            Self::Confirm => "Confirm",
            Self::Next => "Next",
            Self::Previous => "Previous",
            Self::Adjust => "Adjust",
            Self::WatchTV => "WatchTV",
            Self::Viewmode => "Viewmode",
            Self::Teletext => "Teletext",
            Self::Subtitle => "Subtitle",
            Self::ChannelStepUp => "ChannelStepUp",
            Self::ChannelStepDown => "ChannelStepDown",
            Self::Source => "Source",
            Self::AmbilightOnOff => "AmbilightOnOff",
            Self::PlayPause => "PlayPause",
            Self::Pause => "Pause",
            Self::FastForward => "FastForward",
            Self::Stop => "Stop",
            Self::Rewind => "Rewind",
            Self::Record => "Record",
            Self::Online => "Online",
            Self::Standby => "Standby",
        }
    }
}

impl fmt::Display for RemoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemoteKey {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VALID
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| CommandError::InvalidKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_valid_key_round_trips_its_name() {
        for key in RemoteKey::VALID {
            assert_eq!(key.as_str().parse::<RemoteKey>(), Ok(key));
        }
    }

    #[test]
    fn match_is_case_sensitive() {
        assert_eq!(
            "mute".parse::<RemoteKey>(),
            Err(CommandError::InvalidKey("mute".to_string()))
        );
    }

    #[test]
    fn standby_is_not_a_valid_channel_key() {
        assert!(!RemoteKey::VALID.contains(&RemoteKey::Standby));
        assert!("Standby".parse::<RemoteKey>().is_err());
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!("Power".parse::<RemoteKey>().is_err());
        assert!("".parse::<RemoteKey>().is_err());
    }
}
