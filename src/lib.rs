pub mod config;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod transmit;
