//! EVM opcode table covering every hard-fork from Frontier through Cancun.
//!
//! The table is a fixed 256-slot array built at compile time; unassigned bytes
//! are `None`. Each entry carries the upper-case mnemonic and, for `PUSHn`, the
//! width of the immediate that follows the opcode byte.

/// `PUSH0` (Shanghai). Takes no immediate.
pub const PUSH0: u8 = 0x5F;
pub const PUSH1: u8 = 0x60;
pub const PUSH4: u8 = 0x63;
pub const PUSH32: u8 = 0x7F;
pub const SLOAD: u8 = 0x54;
pub const SSTORE: u8 = 0x55;
pub const JUMPDEST: u8 = 0x5B;

/// Mnemonic used for bytes with no assigned opcode.
pub const UNKNOWN: &str = "UNKNOWN";

/// Information about a single opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeInfo {
    pub byte: u8,
    pub name: &'static str,
    /// If this is a `PUSHn`, the number of immediate bytes.
    pub immediate_bytes: u8,
}

const PUSH_NAMES: [&str; 32] = [
    "PUSH1", "PUSH2", "PUSH3", "PUSH4", "PUSH5", "PUSH6", "PUSH7", "PUSH8",
    "PUSH9", "PUSH10", "PUSH11", "PUSH12", "PUSH13", "PUSH14", "PUSH15", "PUSH16",
    "PUSH17", "PUSH18", "PUSH19", "PUSH20", "PUSH21", "PUSH22", "PUSH23", "PUSH24",
    "PUSH25", "PUSH26", "PUSH27", "PUSH28", "PUSH29", "PUSH30", "PUSH31", "PUSH32",
];

const DUP_NAMES: [&str; 16] = [
    "DUP1", "DUP2", "DUP3", "DUP4", "DUP5", "DUP6", "DUP7", "DUP8",
    "DUP9", "DUP10", "DUP11", "DUP12", "DUP13", "DUP14", "DUP15", "DUP16",
];

const SWAP_NAMES: [&str; 16] = [
    "SWAP1", "SWAP2", "SWAP3", "SWAP4", "SWAP5", "SWAP6", "SWAP7", "SWAP8",
    "SWAP9", "SWAP10", "SWAP11", "SWAP12", "SWAP13", "SWAP14", "SWAP15", "SWAP16",
];

const LOG_NAMES: [&str; 5] = ["LOG0", "LOG1", "LOG2", "LOG3", "LOG4"];

static TABLE: [Option<OpcodeInfo>; 256] = build_table();

const fn build_table() -> [Option<OpcodeInfo>; 256] {
    let mut t: [Option<OpcodeInfo>; 256] = [None; 256];

    macro_rules! op {
        ($byte:expr, $name:expr) => {
            t[$byte as usize] = Some(OpcodeInfo {
                byte: $byte,
                name: $name,
                immediate_bytes: 0,
            });
        };
    }

    // -- Stop and Arithmetic -----------------------------------------------
    op!(0x00, "STOP");
    op!(0x01, "ADD");
    op!(0x02, "MUL");
    op!(0x03, "SUB");
    op!(0x04, "DIV");
    op!(0x05, "SDIV");
    op!(0x06, "MOD");
    op!(0x07, "SMOD");
    op!(0x08, "ADDMOD");
    op!(0x09, "MULMOD");
    op!(0x0A, "EXP");
    op!(0x0B, "SIGNEXTEND");

    // -- Comparison and Bitwise Logic --------------------------------------
    op!(0x10, "LT");
    op!(0x11, "GT");
    op!(0x12, "SLT");
    op!(0x13, "SGT");
    op!(0x14, "EQ");
    op!(0x15, "ISZERO");
    op!(0x16, "AND");
    op!(0x17, "OR");
    op!(0x18, "XOR");
    op!(0x19, "NOT");
    op!(0x1A, "BYTE");
    op!(0x1B, "SHL");
    op!(0x1C, "SHR");
    op!(0x1D, "SAR");

    op!(0x20, "SHA3");

    // -- Environment Information -------------------------------------------
    op!(0x30, "ADDRESS");
    op!(0x31, "BALANCE");
    op!(0x32, "ORIGIN");
    op!(0x33, "CALLER");
    op!(0x34, "CALLVALUE");
    op!(0x35, "CALLDATALOAD");
    op!(0x36, "CALLDATASIZE");
    op!(0x37, "CALLDATACOPY");
    op!(0x38, "CODESIZE");
    op!(0x39, "CODECOPY");
    op!(0x3A, "GASPRICE");
    op!(0x3B, "EXTCODESIZE");
    op!(0x3C, "EXTCODECOPY");
    op!(0x3D, "RETURNDATASIZE");
    op!(0x3E, "RETURNDATACOPY");
    op!(0x3F, "EXTCODEHASH");

    // -- Block Information -------------------------------------------------
    op!(0x40, "BLOCKHASH");
    op!(0x41, "COINBASE");
    op!(0x42, "TIMESTAMP");
    op!(0x43, "NUMBER");
    op!(0x44, "DIFFICULTY"); // prevrandao post-Paris
    op!(0x45, "GASLIMIT");
    op!(0x46, "CHAINID");
    op!(0x47, "SELFBALANCE");
    op!(0x48, "BASEFEE");
    op!(0x49, "BLOBHASH");
    op!(0x4A, "BLOBBASEFEE");

    // -- Stack, Memory, Storage and Flow -----------------------------------
    op!(0x50, "POP");
    op!(0x51, "MLOAD");
    op!(0x52, "MSTORE");
    op!(0x53, "MSTORE8");
    op!(SLOAD, "SLOAD");
    op!(SSTORE, "SSTORE");
    op!(0x56, "JUMP");
    op!(0x57, "JUMPI");
    op!(0x58, "PC");
    op!(0x59, "MSIZE");
    op!(0x5A, "GAS");
    op!(JUMPDEST, "JUMPDEST");
    op!(0x5C, "TLOAD");
    op!(0x5D, "TSTORE");
    op!(0x5E, "MCOPY");
    op!(PUSH0, "PUSH0");

    let mut n = 0;
    while n < 32 {
        let byte = PUSH1 + n as u8;
        t[byte as usize] = Some(OpcodeInfo {
            byte,
            name: PUSH_NAMES[n],
            immediate_bytes: n as u8 + 1,
        });
        n += 1;
    }

    let mut n = 0;
    while n < 16 {
        op!(0x80 + n as u8, DUP_NAMES[n]);
        op!(0x90 + n as u8, SWAP_NAMES[n]);
        n += 1;
    }

    let mut n = 0;
    while n < 5 {
        op!(0xA0 + n as u8, LOG_NAMES[n]);
        n += 1;
    }

    // -- System operations -------------------------------------------------
    op!(0xF0, "CREATE");
    op!(0xF1, "CALL");
    op!(0xF2, "CALLCODE");
    op!(0xF3, "RETURN");
    op!(0xF4, "DELEGATECALL");
    op!(0xF5, "CREATE2");
    op!(0xFA, "STATICCALL");
    op!(0xFD, "REVERT");
    op!(0xFE, "INVALID");
    op!(0xFF, "SELFDESTRUCT");

    t
}

/// Look up the table entry for `byte`.
pub fn opcode_info(byte: u8) -> Option<&'static OpcodeInfo> {
    TABLE[byte as usize].as_ref()
}

/// Lookup opcode mnemonic by byte value.
pub fn mnemonic(byte: u8) -> Option<&'static str> {
    opcode_info(byte).map(|info| info.name)
}

/// Get the number of immediate bytes for a given opcode byte.
pub fn immediate_size(byte: u8) -> u8 {
    opcode_info(byte).map_or(0, |info| info.immediate_bytes)
}

/// True for `PUSH1..=PUSH32`. `PUSH0` carries no immediate and is excluded.
#[inline]
pub fn is_push(byte: u8) -> bool {
    (PUSH1..=PUSH32).contains(&byte)
}

/// Number of assigned opcodes in the table.
pub fn assigned_count() -> usize {
    TABLE.iter().filter(|e| e.is_some()).count()
}
