use thiserror::Error;

/// Reasons a command is rejected before any bits are packed.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("command id {0:#x} does not fit in the 8-bit command field")]
    InvalidCommand(u32),

    #[error("temperature {0}C is outside the supported range [17, 30]")]
    TemperatureOutOfRange(i32),

    #[error("failed to pack state word: {0}")]
    Packing(#[from] packed_struct::PackingError),
}
