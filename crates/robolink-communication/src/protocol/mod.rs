//! Device protocol
//!
//! Command vocabulary, response decoding and the protocol client that ties
//! them to a transport.

pub mod client;
pub mod command;
pub mod parser;

pub use client::{DeviceProtocol, DeviceProtocolClient};
pub use command::DeviceCommand;
pub use parser::{ResponseParser, ResponseStatus};
