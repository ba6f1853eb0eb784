pub mod helpers;
pub mod opcodes;
pub mod process;
pub mod signatures;
