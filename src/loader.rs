//! Bytecode loading and linear disassembly.
//!
//! Parses EVM bytecode into a sequence of `(offset, opcode, immediate)`
//! instructions. The scan never fails: unassigned bytes come out as
//! `UNKNOWN`, and a `PUSHn` that runs off the end of the code is emitted once,
//! flagged incomplete, as the final instruction.

use crate::errors::LoaderError;
use crate::utils::helpers::decode_hex;
use crate::utils::opcodes;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A single disassembled instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Byte offset of the opcode.
    pub offset: usize,
    pub opcode: u8,
    pub mnemonic: &'static str,
    /// Immediate bytes of a `PUSHn`; for an incomplete push, whatever remained.
    pub immediate: Option<Vec<u8>>,
    /// Set when the code ended before the declared immediate width.
    pub incomplete: bool,
}

impl Instruction {
    /// Total bytes consumed from the code, opcode included.
    pub fn size(&self) -> usize {
        1 + self.immediate.as_ref().map_or(0, Vec::len)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x} {:02x} {}", self.offset, self.opcode, self.mnemonic)?;
        if let Some(imm) = &self.immediate {
            if !imm.is_empty() {
                write!(f, " 0x{}", hex::encode(imm))?;
            }
        }
        if self.incomplete {
            write!(f, " (incomplete)")?;
        }
        Ok(())
    }
}

/// Lazy left-to-right instruction scanner.
///
/// Cloning the scanner (or calling [`Bytecode::instructions`] again) restarts
/// from the same position with identical output.
#[derive(Debug, Clone)]
pub struct Disassembler<'a> {
    code: &'a [u8],
    offset: usize,
    halted: bool,
}

impl<'a> Disassembler<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self {
            code,
            offset: 0,
            halted: false,
        }
    }
}

impl Iterator for Disassembler<'_> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Instruction> {
        if self.halted || self.offset >= self.code.len() {
            return None;
        }
        let offset = self.offset;
        let opcode = self.code[offset];

        let Some(info) = opcodes::opcode_info(opcode) else {
            self.offset += 1;
            return Some(Instruction {
                offset,
                opcode,
                mnemonic: opcodes::UNKNOWN,
                immediate: None,
                incomplete: false,
            });
        };

        let width = info.immediate_bytes as usize;
        if width == 0 {
            self.offset += 1;
            return Some(Instruction {
                offset,
                opcode,
                mnemonic: info.name,
                immediate: None,
                incomplete: false,
            });
        }

        let start = offset + 1;
        let end = start + width;
        if end > self.code.len() {
            log::debug!(
                "{} at 0x{offset:04x} wants {width} bytes, only {} remain",
                info.name,
                self.code.len() - start
            );
            self.halted = true;
            return Some(Instruction {
                offset,
                opcode,
                mnemonic: info.name,
                immediate: Some(self.code[start..].to_vec()),
                incomplete: true,
            });
        }

        self.offset = end;
        Some(Instruction {
            offset,
            opcode,
            mnemonic: info.name,
            immediate: Some(self.code[start..end].to_vec()),
            incomplete: false,
        })
    }
}

/// Disassemble `code` eagerly.
pub fn disassemble(code: &[u8]) -> Vec<Instruction> {
    Disassembler::new(code).collect()
}

/// Immutable bytecode blob.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bytecode {
    bytes: Vec<u8>,
}

impl Bytecode {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Load bytecode from a hex string (with or without `0x` prefix).
    ///
    /// Returns `Err` on odd-length or non-hex input instead of guessing.
    pub fn from_hex(source: &str) -> Result<Self, LoaderError> {
        decode_hex(source).map(Self::new)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lower-case hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn instructions(&self) -> Disassembler<'_> {
        Disassembler::new(&self.bytes)
    }

    /// Offsets of every `JUMPDEST` reached by the linear scan.
    pub fn jump_dests(&self) -> Vec<usize> {
        self.instructions()
            .filter(|inst| inst.opcode == opcodes::JUMPDEST)
            .map(|inst| inst.offset)
            .collect()
    }

    /// Generate disassembly lines.
    pub fn disasm(&self) -> Vec<String> {
        self.instructions().map(|inst| inst.to_string()).collect()
    }
}

impl FromStr for Bytecode {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<Vec<u8>> for Bytecode {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
