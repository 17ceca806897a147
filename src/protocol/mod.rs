//! Toshiba air conditioner IR protocol.
//!
//! A [`Command`](command::Command) is packed into a 72-bit [`Frame`](frame::Frame)
//! (header word, state word, end byte), which is then serialized MSB first into a
//! [`PulseTrain`](pulse::PulseTrain) of mark/space durations.

pub mod codec;
pub mod command;
pub mod error;
pub mod frame;
pub mod pulse;
