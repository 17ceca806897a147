use packed_struct::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use super::error::CodecError;

pub const MIN_TEMPERATURE: i32 = 17;
pub const MAX_TEMPERATURE: i32 = 30;


/// Indoor unit addressed by a command.
///
/// Occupies bit 4 of the command byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Unit {
    A = 0,
    B = 1
}

impl Unit {
    pub fn index(self) -> u32 {
        self as u32
    }
}


/// Operating mode, `vwx` bits of the state word.
#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, PartialEq, Eq, EnumIter, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Auto = 0,
    Cooling = 1,
    Drying = 2,
    Heating = 3,
    PowerOff = 7
}


/// Fan speed.
///
/// Speed 1 is encoded as `2`; code `1` is never sent by the remote.
#[derive(PrimitiveEnum_u8, Clone, Copy, Debug, PartialEq, Eq, EnumIter, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FanSpeed {
    Auto = 0,
    #[value(alias = "1")]
    Speed1 = 2,
    #[value(alias = "2")]
    Speed2 = 3,
    #[value(alias = "3")]
    Speed3 = 4,
    #[value(alias = "4")]
    Speed4 = 5,
    #[value(alias = "5")]
    Speed5 = 6
}


/// Special power mode.
///
/// Anything other than `None` is sent verbatim as the end byte in place of the state checksum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialMode {
    #[default]
    None = 0,
    HiPower = 1,
    Eco = 3
}

impl SpecialMode {
    pub fn code(self) -> u8 {
        self as u8
    }
}


/// A setpoint in whole degrees Celsius, known to be within [17, 30].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Temperature(u8);

impl Temperature {
    /// Degrees above the minimum setpoint, as carried in the 4-bit state word field.
    pub fn offset(&self) -> u8 {
        self.0 - MIN_TEMPERATURE as u8
    }
}

impl TryFrom<i32> for Temperature {
    type Error = CodecError;

    fn try_from(celsius: i32) -> Result<Self, Self::Error> {
        if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&celsius) {
            return Err(CodecError::TemperatureOutOfRange(celsius));
        }

        Ok(Self(celsius as u8))
    }
}


/// One request for the indoor unit, in any of the supported command shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Command {
    /// Set mode, fan speed and temperature (optionally with hi-power or eco).
    ModeFanTemp {
        unit: Unit,
        mode: Mode,
        fan: FanSpeed,
        temperature: i32,
        #[serde(default)]
        special: SpecialMode,
    },

    /// Fix the louver in its current position.
    Fix {
        unit: Unit
    },

    /// Start the louver swinging.
    Swing {
        unit: Unit
    },
}

impl Command {
    pub fn unit(&self) -> Unit {
        match self {
            Command::ModeFanTemp { unit, .. } => *unit,
            Command::Fix { unit } => *unit,
            Command::Swing { unit } => *unit,
        }
    }
}
