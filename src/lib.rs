//! Ostia: EVM bytecode disassembler, heuristic decompiler and call-data decoder.
//!
//! Takes EVM bytecode (hex) and produces an instruction listing, an external
//! decompiler's output when one is installed, or a heuristic Solidity-like
//! skeleton. Call data is decoded against a selector registry into named,
//! typed parameters.

pub mod abi;
pub mod utils;

pub mod calldata;
pub mod decompiler;
pub mod errors;
pub mod fallback;
pub mod heuristics;
pub mod loader;
pub mod registry;
pub mod solc;
