//! Selector and storage-slot scans over realistic dispatcher fragments.

use ostia::heuristics::{recover, scan_selectors, scan_storage_slots, SLOT_LOOKBACK};
use ostia::registry::SignatureRegistry;

/// Solidity-style dispatcher: DUP1 PUSH4 <sel> EQ PUSH2 <dest> JUMPI, twice.
const DISPATCHER: &str = "60003560e01c80\
                          6370a08231146100385780\
                          6318160ddd14610042575b";

#[test]
fn test_dispatcher_selectors() {
    let code = hex::decode(DISPATCHER).unwrap();
    let report = recover(&code, &SignatureRegistry::seeded());
    let found: Vec<_> = report.selectors.iter().map(|s| s.hex()).collect();
    assert_eq!(found, vec!["0x70a08231", "0x18160ddd"]);
    assert_eq!(report.selectors[0].signature.as_deref(), Some("balanceOf(address)"));
    assert_eq!(report.selectors[1].signature.as_deref(), Some("totalSupply()"));
}

#[test]
fn test_push4_inside_other_immediate_is_still_scanned_bytewise() {
    // PUSH2 63 aa: byte-level scan sees 0x63 at offset 1, but only two bytes follow
    let code = hex::decode("6163aa").unwrap();
    assert!(scan_selectors(&code).is_empty());
}

#[test]
fn test_selector_consumed_bytes_not_reinterpreted() {
    // PUSH4 whose immediate contains PUSH4 and SLOAD bytes
    let code = hex::decode("6363545463").unwrap();
    assert_eq!(scan_selectors(&code), vec![(0, [0x63, 0x54, 0x54, 0x63])]);
}

#[test]
fn test_empty_code() {
    let report = recover(&[], &SignatureRegistry::empty());
    assert!(report.is_empty());
}

#[test]
fn test_push32_slot() {
    let mut code = vec![0x7f];
    let mut slot = [0u8; 32];
    slot[31] = 0x2a;
    slot[0] = 0x80;
    code.extend_from_slice(&slot);
    code.push(0x54);
    let slots: Vec<String> = scan_storage_slots(&code).iter().map(|s| s.hex()).collect();
    assert_eq!(slots, vec![format!("0x80{}2a", "00".repeat(30))]);
}

#[test]
fn test_push_immediate_must_be_present() {
    // PUSH3 whose immediate overlaps the SSTORE byte: all three bytes exist
    let code = [0x62, 0x01, 0x02, 0x55];
    let slots = scan_storage_slots(&code);
    assert_eq!(slots.len(), 1);
    assert_eq!(slots.iter().next().unwrap().hex(), "0x10255");

    // PUSH4 with only two bytes left in the code
    let code = [0x63, 0x01, 0x54];
    assert!(scan_storage_slots(&code).is_empty());
}

#[test]
fn test_no_guess_beyond_window() {
    for gap in [SLOT_LOOKBACK, SLOT_LOOKBACK + 5] {
        let mut code = vec![0x60, 0x07];
        code.extend(std::iter::repeat(0x50).take(gap));
        code.push(0x54);
        // distance from push opcode to SLOAD is gap + 2
        assert!(scan_storage_slots(&code).is_empty(), "gap {gap}");
    }
}

#[test]
fn test_report_json_labels_heuristic() {
    let code = hex::decode("6001545b").unwrap();
    let json = recover(&code, &SignatureRegistry::empty()).to_json();
    assert_eq!(json["heuristic"], true);
    assert_eq!(json["storage_slots"][0], "0x1");
}
