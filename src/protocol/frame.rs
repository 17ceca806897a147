use std::fmt;

use packed_struct::prelude::*;
use tracing::debug;

use super::command::{Command, FanSpeed, Mode, SpecialMode, Temperature, Unit};
use super::error::CodecError;


/// Top 24 bits of every header word.
pub const HEADER_PREFIX: u32 = 0xF20D_0000;

/// Command family id for mode/fan/temperature frames.
pub const MODE_FAN_TEMP_COMMAND: u32 = 0x03;

/// Command family id for check/fix/swing frames.
pub const CHECK_FIX_SWING_COMMAND: u32 = 0x01;

/// End byte telling the unit there is no state checksum to verify.
pub const NO_CHECKSUM: u8 = 0x60;

pub const FIX_STATE: u32 = 0x2100_2100;
pub const SWING_STATE: u32 = 0x2104_2500;

/// `efgh` nibble of the state word for a normal frame.
const NORMAL_FLAG: u8 = 1;

/// `efgh` nibble of the state word when a special mode byte follows.
const SPECIAL_FLAG: u8 = 9;


trait Checksum {
    fn checksum(&mut self) -> u8;
}

impl<'a> Checksum for std::slice::Iter<'a, u8> {
    fn checksum(&mut self) -> u8 {
        self.fold(0, |acc, byte| acc ^ byte)
    }
}


/// Build the header word for `command`, appending its checksum byte.
///
/// The checksum is the XOR of the three bytes above it.
pub fn build_header(command: u32) -> Result<u32, CodecError> {
    if command > 0xFF {
        return Err(CodecError::InvalidCommand(command));
    }

    let header = HEADER_PREFIX | (command << 8);
    let checksum = header.to_be_bytes()[..3].iter().checksum();

    Ok(header | checksum as u32)
}

fn command_byte(unit: Unit, family: u32) -> u32 {
    (unit.index() << 4) | family
}


/// State word of a mode/fan/temperature frame.
///
/// ```text
/// abcd efgh ijkl mnop qrst uvwx yz23 4567
/// 0000 0001 0110 0000 0000 0111 0000 0000   23C, fan auto, power off
///      efgh                                 1 = normal, 9 = special mode byte follows
///           ijkl                            degrees above 17
///                  op qrs                   fan speed
///                        t uvwx             mode
/// ```
#[derive(PackedStruct, Debug)]
#[packed_struct(bit_numbering="msb0", size_bytes="4")]
pub struct ModeFanTempState {
    #[packed_field(bytes="0")]
    pub flag: u8,

    #[packed_field(bits="8..=11")]
    pub temperature_offset: Integer<u8, packed_bits::Bits::<4>>,

    #[packed_field(bits="14..=18", ty="enum")]
    pub fan: FanSpeed,

    #[packed_field(bits="19..=23", ty="enum")]
    pub mode: Mode,
}

impl ModeFanTempState {
    pub fn new(mode: Mode, special: SpecialMode, fan: FanSpeed, temperature: Temperature) -> Self {
        Self {
            flag: if special == SpecialMode::None { NORMAL_FLAG } else { SPECIAL_FLAG },
            temperature_offset: (temperature.offset() & 0xF).into(),
            fan,
            mode,
        }
    }

    pub fn word(&self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.pack()?))
    }
}


/// A complete 72-bit frame: header word, state word and end byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
    header: u32,
    state: u32,
    end: u8,
}

impl Frame {
    pub const BITS: usize = 72;

    fn new(command: u32, state: u32, end: u8) -> Result<Self, CodecError> {
        let frame = Self {
            header: build_header(command)?,
            state,
            end,
        };

        debug!(command = frame.command(), %frame, "built frame");

        Ok(frame)
    }

    /// Mode, fan speed and temperature.
    ///
    /// With `special` set the end byte carries the special mode code instead of the state checksum.
    pub fn mode_fan_temp(unit: Unit, mode: Mode, special: SpecialMode, fan: FanSpeed, celsius: i32) -> Result<Self, CodecError> {
        let temperature = Temperature::try_from(celsius)?;
        let state = ModeFanTempState::new(mode, special, fan, temperature).word()?;

        let end = match special {
            SpecialMode::None => state.to_be_bytes().iter().checksum(),
            special => special.code()
        };

        Self::new(command_byte(unit, MODE_FAN_TEMP_COMMAND), state, end)
    }

    /// Hold the louver where it is.
    pub fn fix(unit: Unit) -> Result<Self, CodecError> {
        Self::new(command_byte(unit, CHECK_FIX_SWING_COMMAND), FIX_STATE, NO_CHECKSUM)
    }

    /// Swing the louver.
    pub fn swing(unit: Unit) -> Result<Self, CodecError> {
        Self::new(command_byte(unit, CHECK_FIX_SWING_COMMAND), SWING_STATE, NO_CHECKSUM)
    }

    pub fn from_command(command: &Command) -> Result<Self, CodecError> {
        match *command {
            Command::ModeFanTemp { unit, mode, fan, temperature, special } => {
                Self::mode_fan_temp(unit, mode, special, fan, temperature)
            },
            Command::Fix { unit } => Self::fix(unit),
            Command::Swing { unit } => Self::swing(unit),
        }
    }

    /// Frame with arbitrary contents, checksums not enforced.
    #[cfg(test)]
    pub(crate) fn from_parts(header: u32, state: u32, end: u8) -> Self {
        Self { header, state, end }
    }

    pub fn header(&self) -> u32 {
        self.header
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn end(&self) -> u8 {
        self.end
    }

    /// Command byte carried in bits `[15:8]` of the header word.
    pub fn command(&self) -> u8 {
        (self.header >> 8) as u8
    }

    /// All 72 bits in transmission order, most significant bit of each part first.
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        let header = (0..32).rev().map(move |i| (self.header >> i) & 1 == 1);
        let state = (0..32).rev().map(move |i| (self.state >> i) & 1 == 1);
        let end = (0..8).rev().map(move |i| (self.end >> i) & 1 == 1);

        header.chain(state).chain(end)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X} {:#X} {:#X}", self.header, self.state, self.end)
    }
}


#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    use super::*;

    fn xor_bytes(word: u32) -> u8 {
        word.to_be_bytes().iter().checksum()
    }

    #[test]
    fn test_power_off_example() {
        let frame = Frame::mode_fan_temp(Unit::A, Mode::PowerOff, SpecialMode::None, FanSpeed::Auto, 23).expect("build");

        assert_eq!(frame.command(), 0x03);
        assert_eq!(frame.header(), 0xF20D03FC);
        assert_eq!(frame.state(), 0x01600700);
        assert_eq!(frame.end(), 0x66);
        assert_eq!(frame.to_string(), "0xF20D03FC 0x1600700 0x66");
    }

    #[test]
    fn test_header_values() {
        assert_eq!(build_header(0x00).unwrap(), 0xF20D00FF);
        assert_eq!(build_header(0x01).unwrap(), 0xF20D01FE);
        assert_eq!(build_header(0x11).unwrap(), 0xF20D11EE);
        assert_eq!(build_header(0x13).unwrap(), 0xF20D13EC);
        assert_eq!(build_header(0xFF).unwrap(), 0xF20DFF00);
    }

    #[test]
    fn test_header_rejects_wide_command() {
        assert!(matches!(build_header(0x100), Err(CodecError::InvalidCommand(0x100))));
        assert!(matches!(build_header(u32::MAX), Err(CodecError::InvalidCommand(u32::MAX))));
    }

    #[test]
    fn test_state_layout() {
        let temperature = Temperature::try_from(30i32).unwrap();
        let state = ModeFanTempState::new(Mode::Heating, SpecialMode::Eco, FanSpeed::Speed5, temperature);

        let expected: u32 = (9 << 24) | (13 << 20) | (6 << 13) | (3 << 8);
        assert_eq!(state.word().unwrap(), expected);

        let unpacked = ModeFanTempState::unpack(&expected.to_be_bytes()).unwrap();
        assert_eq!(unpacked.flag, 9);
        assert_eq!(*unpacked.temperature_offset, 13);
        assert_eq!(unpacked.fan, FanSpeed::Speed5);
        assert_eq!(unpacked.mode, Mode::Heating);
    }

    #[test]
    fn test_special_mode_end_byte() {
        let hi = Frame::mode_fan_temp(Unit::A, Mode::Cooling, SpecialMode::HiPower, FanSpeed::Auto, 25).unwrap();
        assert_eq!(hi.state >> 24, 9);
        assert_eq!(hi.end, 0x01);

        let eco = Frame::mode_fan_temp(Unit::B, Mode::Cooling, SpecialMode::Eco, FanSpeed::Auto, 25).unwrap();
        assert_eq!(eco.state, hi.state);
        assert_eq!(eco.end, 0x03);
        assert_eq!(eco.command(), 0x13);
    }

    #[test]
    fn test_temperature_out_of_range() {
        for celsius in [16, 31, -5] {
            let res = Frame::mode_fan_temp(Unit::A, Mode::Auto, SpecialMode::None, FanSpeed::Auto, celsius);
            assert!(matches!(res, Err(CodecError::TemperatureOutOfRange(c)) if c == celsius));
        }
    }

    #[test]
    fn test_fix_and_swing() {
        let fix_a = Frame::fix(Unit::A).unwrap();
        assert_eq!(fix_a, Frame { header: 0xF20D01FE, state: 0x21002100, end: 0x60 });
        assert_eq!(fix_a, Frame::fix(Unit::A).unwrap());

        let fix_b = Frame::fix(Unit::B).unwrap();
        assert_eq!(fix_b, Frame { header: 0xF20D11EE, state: 0x21002100, end: 0x60 });

        let swing_b = Frame::swing(Unit::B).unwrap();
        assert_eq!(swing_b, Frame { header: 0xF20D11EE, state: 0x21042500, end: 0x60 });
        assert_eq!(swing_b, Frame::swing(Unit::B).unwrap());

        // the unit bit flips in the command byte and again in the checksum byte
        assert_eq!(fix_a.header ^ fix_b.header, 0x0000_1010);
        assert_eq!(fix_a.state, fix_b.state);
    }

    #[test]
    fn test_from_command() {
        let cmd = Command::Swing { unit: Unit::A };
        assert_eq!(Frame::from_command(&cmd).unwrap(), Frame::swing(Unit::A).unwrap());

        let cmd = Command::ModeFanTemp {
            unit: Unit::A,
            mode: Mode::PowerOff,
            fan: FanSpeed::Auto,
            temperature: 23,
            special: SpecialMode::None,
        };
        assert_eq!(Frame::from_command(&cmd).unwrap().state, 0x01600700);
    }

    #[test]
    fn test_bits_order() {
        let frame = Frame { header: 0x8000_0001, state: 0x0000_0000, end: 0x81 };
        let bits: Vec<bool> = frame.bits().collect();

        assert_eq!(bits.len(), Frame::BITS);
        assert!(bits[0]);
        assert!(bits[1..31].iter().all(|bit| !bit));
        assert!(bits[31]);
        assert!(bits[32..64].iter().all(|bit| !bit));
        assert!(bits[64]);
        assert!(bits[71]);
    }

    #[test]
    fn test_all_combinations_build() {
        for unit in Unit::iter() {
            for mode in Mode::iter() {
                for fan in FanSpeed::iter() {
                    for special in SpecialMode::iter() {
                        for celsius in 17..=30 {
                            let frame = Frame::mode_fan_temp(unit, mode, special, fan, celsius).unwrap();

                            assert_eq!(frame.command(), ((unit as u8) << 4) | 0x03);
                            assert_eq!((frame.state >> 20) & 0xF, (celsius - 17) as u32);
                            assert_eq!((frame.state >> 13) & 0x1F, fan.to_primitive() as u32);
                            assert_eq!((frame.state >> 8) & 0x1F, mode.to_primitive() as u32);
                            assert_eq!(frame.state & 0xFF, 0);
                        }
                    }
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_header_checksum(command in 0u32..=0xFF) {
            let header = build_header(command).unwrap();
            let [b3, b2, b1, b0] = header.to_be_bytes();

            prop_assert_eq!(b3 ^ b2 ^ b1, b0);
            prop_assert_eq!(b1 as u32, command);
            prop_assert_eq!(header & 0xFFFF_0000, HEADER_PREFIX);
            prop_assert_eq!(build_header(command).unwrap(), header);
        }

        #[test]
        fn prop_header_rejects(command in 0x100u32..) {
            prop_assert!(matches!(build_header(command), Err(CodecError::InvalidCommand(_))));
        }

        #[test]
        fn prop_temperature_field(celsius in 17i32..=30, special_eco in any::<bool>()) {
            let special = if special_eco { SpecialMode::Eco } else { SpecialMode::None };
            let frame = Frame::mode_fan_temp(Unit::B, Mode::Drying, special, FanSpeed::Speed2, celsius).unwrap();

            prop_assert_eq!(((frame.state >> 20) & 0xF) as i32, celsius - 17);
        }

        #[test]
        fn prop_temperature_rejected(celsius in any::<i32>().prop_filter("out of range", |c| !(17..=30).contains(c))) {
            let res = Frame::mode_fan_temp(Unit::A, Mode::Cooling, SpecialMode::None, FanSpeed::Auto, celsius);
            prop_assert!(matches!(res, Err(CodecError::TemperatureOutOfRange(_))));
        }

        #[test]
        fn prop_end_byte(celsius in 17i32..=30, mode_idx in 0usize..5, fan_idx in 0usize..6, special_idx in 0usize..3) {
            let mode = Mode::iter().nth(mode_idx).unwrap();
            let fan = FanSpeed::iter().nth(fan_idx).unwrap();
            let special = SpecialMode::iter().nth(special_idx).unwrap();

            let frame = Frame::mode_fan_temp(Unit::A, mode, special, fan, celsius).unwrap();

            if special == SpecialMode::None {
                prop_assert_eq!(frame.end, xor_bytes(frame.state));
                prop_assert_eq!(frame.state >> 24, 1);
            } else {
                prop_assert_eq!(frame.end, special.code());
                prop_assert_eq!(frame.state >> 24, 9);
            }
        }
    }
}
