//! Device dialect description.
//!
//! A [`PlatformProfile`] holds everything that is specific to one family of
//! AT-command devices: the baud rates worth probing, the literals switching
//! in and out of command mode, the request templates of the configuration
//! commands and the responses they are answered with. The command engine
//! itself hard-codes none of it.
//!
//! Profiles are plain data. The RN-42 one is built in; others can be loaded
//! from TOML:
//!
//! ```toml
//! name = "rn42"
//! baud_rates = [9600, 115200]
//! max_name_len = 20
//! reboot = "R,1\r"
//! get_name = "GN\r"
//! get_device_id = "GB\r"
//! query_terminator = "\r\n"
//!
//! [enter_command_mode]
//! request = "$$$"
//! response = "CMD"
//!
//! # ... `exit_command_mode`, `set_baud`, `set_name` and
//! # `set_name_persistent` follow the same shape, and `baud_codes` maps
//! # each supported rate to the token used in `set_baud`:
//!
//! [[baud_codes]]
//! baud = 9600
//! code = "9600"
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{ProfileError, RequestError};

/// Marks where the argument goes in a request template.
pub const PLACEHOLDER: &str = "{}";

/// A request and the exact response confirming it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub request: String,
    pub response: String,
}

impl Exchange {
    fn new(request: &str, response: &str) -> Self {
        Exchange {
            request: request.into(),
            response: response.into(),
        }
    }
}

/// The token a device expects in its set-baud request for a given rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaudCode {
    pub baud: u32,
    pub code: String,
}

/// The AT dialect of one device family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformProfile {
    /// Short name, used in diagnostics.
    pub name: String,
    /// Host baud rates tried, in order, when entering command mode.
    pub baud_rates: Vec<u32>,
    /// Longest name `set_name` accepts, in bytes.
    pub max_name_len: usize,
    /// Reboot request. The device does not answer it.
    pub reboot: String,
    /// Request for the device name.
    pub get_name: String,
    /// Request for the device identity (address).
    pub get_device_id: String,
    /// Ends the variable length payload of `get_name` and `get_device_id`.
    pub query_terminator: String,
    pub enter_command_mode: Exchange,
    pub exit_command_mode: Exchange,
    /// `request` is a template, the baud code replaces the placeholder.
    pub set_baud: Exchange,
    /// `request` is a template, the name replaces the placeholder.
    pub set_name: Exchange,
    /// Like `set_name`, for a name the device keeps as its persistent
    /// (serialized) friendly name.
    pub set_name_persistent: Exchange,
    #[serde(default)]
    pub baud_codes: Vec<BaudCode>,
}

impl PlatformProfile {
    /// The Roving Networks RN-42 Bluetooth module.
    pub fn rn42() -> Self {
        let codes: &[(u32, &str)] = &[
            (1200, "1200"),
            (2400, "2400"),
            (4800, "4800"),
            (9600, "9600"),
            (19_200, "19.2"),
            (38_400, "38.4"),
            (57_600, "57.6"),
            (115_200, "115K"),
            (230_400, "230K"),
            (460_800, "460K"),
            (921_600, "921K"),
        ];
        PlatformProfile {
            name: "rn42".into(),
            baud_rates: vec![9600, 19_200, 38_400, 57_600, 115_200, 230_400],
            max_name_len: 20,
            reboot: "R,1\r".into(),
            get_name: "GN\r".into(),
            get_device_id: "GB\r".into(),
            query_terminator: "\r\n".into(),
            enter_command_mode: Exchange::new("$$$", "CMD"),
            exit_command_mode: Exchange::new("---\r", "END"),
            set_baud: Exchange::new("SU,{}\r", "AOK"),
            set_name: Exchange::new("SN,{}\r", "AOK"),
            set_name_persistent: Exchange::new("S-,{}\r", "AOK"),
            baud_codes: codes
                .iter()
                .map(|&(baud, code)| BaudCode {
                    baud,
                    code: code.into(),
                })
                .collect(),
        }
    }

    /// Parse and validate a TOML profile.
    pub fn from_toml_str(text: &str) -> Result<Self, ProfileError> {
        let profile: PlatformProfile = toml::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load, parse and validate a TOML profile file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render the profile as TOML, e.g. as a starting point for a custom one.
    pub fn to_toml_string(&self) -> String {
        // Only strings, integers, tables and arrays of them: cannot fail.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject profiles the command engine cannot work with.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.baud_rates.is_empty() {
            return Err(ProfileError::NoBaudRates(self.name.clone()));
        }

        let literals = [
            ("enter_command_mode.request", &self.enter_command_mode.request),
            ("enter_command_mode.response", &self.enter_command_mode.response),
            ("exit_command_mode.request", &self.exit_command_mode.request),
            ("exit_command_mode.response", &self.exit_command_mode.response),
            ("set_baud.response", &self.set_baud.response),
            ("set_name.response", &self.set_name.response),
            ("set_name_persistent.response", &self.set_name_persistent.response),
            ("reboot", &self.reboot),
            ("get_name", &self.get_name),
            ("get_device_id", &self.get_device_id),
            ("query_terminator", &self.query_terminator),
        ];
        for &(field, value) in literals.iter() {
            if value.is_empty() {
                return Err(ProfileError::EmptyLiteral {
                    profile: self.name.clone(),
                    field,
                });
            }
        }

        let templates = [
            ("set_baud.request", &self.set_baud.request),
            ("set_name.request", &self.set_name.request),
            ("set_name_persistent.request", &self.set_name_persistent.request),
        ];
        for &(field, value) in templates.iter() {
            if !value.contains(PLACEHOLDER) {
                return Err(ProfileError::MissingPlaceholder {
                    profile: self.name.clone(),
                    field,
                });
            }
        }
        Ok(())
    }

    /// The token standing for `baud` in the set-baud request.
    pub fn baud_code(&self, baud: u32) -> Option<&str> {
        self.baud_codes
            .iter()
            .find(|c| c.baud == baud)
            .map(|c| c.code.as_str())
    }

    /// Format the request changing the device baud rate.
    pub fn set_baud_request(&self, baud: u32) -> Result<String, RequestError> {
        let code = self
            .baud_code(baud)
            .ok_or(RequestError::UnsupportedBaud(baud))?;
        Ok(fill(&self.set_baud.request, code))
    }

    /// Format the request renaming the device, checking the name against the
    /// device limits first.
    pub fn set_name_request(&self, name: &str, persist: bool) -> Result<String, RequestError> {
        if name.is_empty() {
            return Err(RequestError::EmptyName);
        }
        if name.len() > self.max_name_len {
            return Err(RequestError::NameTooLong {
                len: name.len(),
                max: self.max_name_len,
            });
        }
        if name.chars().any(|c| c.is_control() || c == ',') {
            return Err(RequestError::InvalidNameCharacter);
        }
        Ok(fill(&self.name_exchange(persist).request, name))
    }

    /// The exchange used by `set_name`.
    pub fn name_exchange(&self, persist: bool) -> &Exchange {
        if persist {
            &self.set_name_persistent
        } else {
            &self.set_name
        }
    }
}

impl Default for PlatformProfile {
    fn default() -> Self {
        Self::rn42()
    }
}

fn fill(template: &str, argument: &str) -> String {
    template.replacen(PLACEHOLDER, argument, 1)
}

// =============================================================================
// Unit Tests
// =============================================================================
