//! Command implementations for the OxiStream CLI.

pub mod crc;
pub mod decode;
pub mod encode;
pub mod inspect;

pub use crc::cmd_crc;
pub use decode::cmd_decode;
pub use encode::cmd_encode;
pub use inspect::cmd_inspect;
