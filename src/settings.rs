//! Settings related to the serial port and the device dialect.
//!
//! Use the [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
//! pattern to set the configurable values.

pub use serialport::{DataBits, FlowControl, Parity, StopBits};

use crate::{error::ProfileError, profile::PlatformProfile};

// =============================================================================
// Public Interface
// =============================================================================

/// Groups all settings related to the serial port used to talk to the device
/// and acts as a
/// [builder](https://doc.rust-lang.org/1.0.0/style/ownership/builders.html)
/// for the settings.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Settings {
    /// The port name, usually the device path.
    pub path: Option<String>,
    /// The baud rate the port is opened at, in symbols-per-second. Probing
    /// for command mode may switch to other rates of the profile.
    pub baud_rate: u32,
    /// Number of bits used to represent a character sent on the line.
    pub data_bits: DataBits,
    /// The type of signalling to use for controlling data transfer.
    pub flow_control: FlowControl,
    /// The type of parity to use for error checking.
    pub parity: Parity,
    /// Number of bits to use to signal the end of a character.
    pub stop_bits: StopBits,

    /// Path to a TOML platform profile. Optional, when not set the built-in
    /// RN-42 profile is used.
    pub profile: Option<String>,

    /// Leave the device in command mode once done instead of switching it
    /// back to data mode.
    pub stay_in_command_mode: bool,

    /// Restrict creation of `Settings` instances unless through the
    /// `SettingsBuilder`.
    #[doc(hidden)]
    _private_use_builder: (),
}

impl Settings {
    /// The platform profile selected by these settings.
    pub fn load_profile(&self) -> Result<PlatformProfile, ProfileError> {
        match &self.profile {
            Some(path) => PlatformProfile::from_file(path),
            None => Ok(PlatformProfile::rn42()),
        }
    }
}

/// The builder for the `Settings` values.
///
/// All values are optional and have default values that will be used if not
/// explicitly set.
///
/// **Example**
///
/// ```
/// use atcommander::SettingsBuilder;
///
/// let settings = SettingsBuilder::new().path("/dev/ttyUSB0").finalize();
/// assert_eq!(settings.baud_rate, 115_200);
/// ```
pub struct SettingsBuilder {
    settings: Settings,
}
impl SettingsBuilder {
    /// Start building the settings using default values and no path for the
    /// port.
    pub fn new() -> Self {
        SettingsBuilder {
            settings: Settings {
                path: None,
                baud_rate: 115_200,
                data_bits: DataBits::Eight,
                flow_control: FlowControl::None,
                parity: Parity::None,
                stop_bits: StopBits::One,
                profile: None,
                stay_in_command_mode: false,
                _private_use_builder: (),
            },
        }
    }

    /// Set the path to the serial port
    pub fn path<'a>(mut self, path: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.settings.path = Some(path.into().into_owned());
        self
    }

    /// Set the baud rate in symbols-per-second
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.settings.baud_rate = baud_rate;
        self
    }

    /// Set the number of bits used to represent a character sent on the line
    pub fn data_bits(mut self, data_bits: DataBits) -> Self {
        self.settings.data_bits = data_bits;
        self
    }

    /// Set the type of signalling to use for controlling data transfer
    pub fn flow_control(mut self, flow_control: FlowControl) -> Self {
        self.settings.flow_control = flow_control;
        self
    }

    /// Set the type of parity to use for error checking
    pub fn parity(mut self, parity: Parity) -> Self {
        self.settings.parity = parity;
        self
    }

    /// Set the number of bits to use to signal the end of a character
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.settings.stop_bits = stop_bits;
        self
    }

    /// Set the path to a TOML platform profile
    pub fn profile<'a>(mut self, profile: impl Into<std::borrow::Cow<'a, str>>) -> Self {
        self.settings.profile = Some(profile.into().into_owned());
        self
    }

    /// Keep the device in command mode when done
    pub fn stay_in_command_mode(mut self, stay: bool) -> Self {
        self.settings.stay_in_command_mode = stay;
        self
    }

    pub fn finalize(self) -> Settings {
        self.settings
    }
}
impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_default() {
        let settings = SettingsBuilder::new().finalize();
        assert_eq!(
            settings,
            Settings {
                path: None,
                baud_rate: 115_200,
                data_bits: DataBits::Eight,
                flow_control: FlowControl::None,
                parity: Parity::None,
                stop_bits: StopBits::One,
                profile: None,
                stay_in_command_mode: false,
                _private_use_builder: (),
            }
        )
    }

    #[test]
    fn path() {
        let settings = SettingsBuilder::new().path("/dev/ttyUSB0").finalize();
        assert_eq!(settings.path.unwrap(), "/dev/ttyUSB0");
    }

    #[test]
    fn baud_rate() {
        let settings = SettingsBuilder::new().baud_rate(9600).finalize();
        assert_eq!(settings.baud_rate, 9600);
    }

    #[test]
    fn line_parameters() {
        let settings = SettingsBuilder::new()
            .data_bits(DataBits::Seven)
            .flow_control(FlowControl::Hardware)
            .parity(Parity::Even)
            .stop_bits(StopBits::Two)
            .finalize();
        assert_eq!(settings.data_bits, DataBits::Seven);
        assert_eq!(settings.flow_control, FlowControl::Hardware);
        assert_eq!(settings.parity, Parity::Even);
        assert_eq!(settings.stop_bits, StopBits::Two);
    }

    #[test]
    fn stay_in_command_mode() {
        let settings = SettingsBuilder::new().stay_in_command_mode(true).finalize();
        assert!(settings.stay_in_command_mode);
    }

    #[test]
    fn builtin_profile_by_default() {
        let settings = SettingsBuilder::new().finalize();
        assert_eq!(settings.load_profile().unwrap(), PlatformProfile::rn42());
    }

    #[test]
    fn profile_from_file() {
        use std::io::Write;

        let mut profile = PlatformProfile::rn42();
        profile.name = "rn41".into();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(profile.to_toml_string().as_bytes()).unwrap();

        let settings = SettingsBuilder::new()
            .profile(file.path().to_string_lossy())
            .finalize();
        assert_eq!(settings.load_profile().unwrap(), profile);
    }
}
