use std::fmt;

use super::frame::Frame;


// Durations in microseconds.
pub const HEADER_MARK: u32 = 4496;
pub const HEADER_SPACE: u32 = 4414;
pub const BIT_MARK: u32 = 591;
pub const ONE_SPACE: u32 = 1643;
pub const ZERO_SPACE: u32 = 591;
pub const TRAILER_MARK: u32 = 600;


/// A single period of the carrier being on (mark) or off (space).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pulse {
    Mark(u32),
    Space(u32)
}

impl fmt::Display for Pulse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pulse::Mark(us) => write!(f, "+{us}"),
            Pulse::Space(us) => write!(f, "-{us}"),
        }
    }
}


/// The timed mark/space sequence for one frame.
///
/// Renders as `+4496 -4414 +591 -1643 ... +600 `, the raw format `ir-ctl --send` reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PulseTrain {
    pulses: Vec<Pulse>
}

impl PulseTrain {
    /// Header pair, two pulses per frame bit, trailing mark.
    pub const LEN: usize = 2 + 2 * Frame::BITS + 1;

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }
}

impl From<&Frame> for PulseTrain {
    fn from(frame: &Frame) -> Self {
        let mut pulses = Vec::with_capacity(Self::LEN);

        pulses.push(Pulse::Mark(HEADER_MARK));
        pulses.push(Pulse::Space(HEADER_SPACE));

        for bit in frame.bits() {
            pulses.push(Pulse::Mark(BIT_MARK));
            pulses.push(Pulse::Space(if bit { ONE_SPACE } else { ZERO_SPACE }));
        }

        pulses.push(Pulse::Mark(TRAILER_MARK));

        Self { pulses }
    }
}

impl From<Frame> for PulseTrain {
    fn from(frame: Frame) -> Self {
        Self::from(&frame)
    }
}

impl fmt::Display for PulseTrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pulse in &self.pulses {
            write!(f, "{pulse} ")?;
        }

        Ok(())
    }
}
