use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use super::pulse::PulseTrain;


/// Longest token is `+4496 `.
const MAX_TOKEN_LEN: usize = 6;


/// Writes pulse trains in the raw text format read by `ir-ctl --send`.
///
/// Each pulse is a signed duration followed by a single space, marks positive and spaces negative.
/// Nothing is written between consecutive trains.
#[derive(Debug, Default)]
pub struct PulseTrainCodec;

impl PulseTrainCodec {
    pub fn new() -> Self {
        PulseTrainCodec
    }
}

impl Encoder<PulseTrain> for PulseTrainCodec {
    type Error = std::io::Error;

    fn encode(&mut self, train: PulseTrain, dst: &mut BytesMut) -> Result<(), Self::Error> {
        <Self as Encoder<&PulseTrain>>::encode(self, &train, dst)
    }
}

impl Encoder<&PulseTrain> for PulseTrainCodec {
    type Error = std::io::Error;

    fn encode(&mut self, train: &PulseTrain, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(train.len() * MAX_TOKEN_LEN);

        for pulse in train.pulses() {
            dst.put(pulse.to_string().as_bytes());
            dst.put_u8(b' ');
        }

        Ok(())
    }
}
