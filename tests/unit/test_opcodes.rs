//! Extended tests for opcode table coverage across all hard forks.

use ostia::utils::opcodes::*;

#[test]
fn test_all_frontier_opcodes_present() {
    let frontier_ops: &[u8] = &[
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B,
        0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A,
        0x20,
        0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x3B, 0x3C,
        0x40, 0x41, 0x42, 0x43, 0x44, 0x45,
        0x50, 0x51, 0x52, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59, 0x5A, 0x5B,
        0xF0, 0xF1, 0xF2, 0xF3, 0xFE, 0xFF,
    ];
    for &byte in frontier_ops {
        assert!(opcode_info(byte).is_some(), "missing frontier opcode 0x{byte:02x}");
    }
}

#[test]
fn test_later_fork_opcodes_present() {
    // Byzantium .. Cancun
    let later: &[(u8, &str)] = &[
        (0x1B, "SHL"),
        (0x1C, "SHR"),
        (0x1D, "SAR"),
        (0x3D, "RETURNDATASIZE"),
        (0x3E, "RETURNDATACOPY"),
        (0x3F, "EXTCODEHASH"),
        (0x46, "CHAINID"),
        (0x47, "SELFBALANCE"),
        (0x48, "BASEFEE"),
        (0x49, "BLOBHASH"),
        (0x4A, "BLOBBASEFEE"),
        (0x5C, "TLOAD"),
        (0x5D, "TSTORE"),
        (0x5E, "MCOPY"),
        (0x5F, "PUSH0"),
        (0xF4, "DELEGATECALL"),
        (0xF5, "CREATE2"),
        (0xFA, "STATICCALL"),
        (0xFD, "REVERT"),
    ];
    for &(byte, name) in later {
        assert_eq!(mnemonic(byte), Some(name), "0x{byte:02x}");
    }
}

#[test]
fn test_push_range() {
    for n in 1u8..=32 {
        let byte = PUSH1 + n - 1;
        assert_eq!(mnemonic(byte), Some(format!("PUSH{n}").as_str()));
        assert_eq!(immediate_size(byte), n);
    }
}

#[test]
fn test_dup_swap_log_ranges() {
    for n in 1u8..=16 {
        assert_eq!(mnemonic(0x7F + n), Some(format!("DUP{n}").as_str()));
        assert_eq!(mnemonic(0x8F + n), Some(format!("SWAP{n}").as_str()));
    }
    for n in 0u8..=4 {
        assert_eq!(mnemonic(0xA0 + n), Some(format!("LOG{n}").as_str()));
    }
}

#[test]
fn test_only_pushes_carry_immediates() {
    for byte in 0..=255u8 {
        if is_push(byte) {
            assert!(immediate_size(byte) > 0);
        } else {
            assert_eq!(immediate_size(byte), 0, "0x{byte:02x}");
        }
    }
}

#[test]
fn test_assigned_count() {
    assert_eq!(assigned_count(), 149);
}

#[test]
fn test_heuristic_constants() {
    assert_eq!(mnemonic(PUSH4), Some("PUSH4"));
    assert_eq!(mnemonic(SLOAD), Some("SLOAD"));
    assert_eq!(mnemonic(SSTORE), Some("SSTORE"));
    assert_eq!(mnemonic(JUMPDEST), Some("JUMPDEST"));
}
