//! Solidity ABI: type tags, head/tail parameter decoding and ABI JSON documents.

pub mod decoder;
pub mod json;
pub mod types;

pub use decoder::decode_parameters;
pub use types::{AbiType, AbiValue};
