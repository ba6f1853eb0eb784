//! Advisory pseudo-Solidity listing used when no external decompiler succeeds.
//!
//! The output is documentation for a human reader. It is not compilable and
//! says so in its header.

use crate::heuristics::HeuristicReport;
use crate::loader::Disassembler;
use std::fmt::Write;

/// Instructions reproduced in the trailing comment block.
pub const LISTING_LIMIT: usize = 100;
pub const TRUNCATION_MARKER: &str = "...(truncated)";
pub const HEADER: &str = "// Fallback decompilation - heuristic Solidity-like listing, not compilable source";

const NO_BODY: &str = "        // Implementation details not available";

/// Render `code` and its heuristic report as a commented contract skeleton.
pub fn render_fallback(code: &[u8], report: &HeuristicReport) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n// Selectors and storage slots below are pattern-matched guesses.\n\n");
    out.push_str("pragma solidity ^0.8.0;\n\n");
    out.push_str("contract DecompiledContract {\n");

    // `write!` into a String cannot fail.
    if !report.storage_slots.is_empty() {
        out.push_str("    // Detected storage variables (heuristic)\n");
        for (i, slot) in report.storage_slots.iter().enumerate() {
            let _ = writeln!(out, "    uint256 private _storage{i}; // slot: {}", slot.hex());
        }
        out.push('\n');
    }

    if !report.selectors.is_empty() {
        out.push_str("    // Detected function selectors (heuristic)\n");
        for sel in &report.selectors {
            if let Some(sig) = &sel.signature {
                let _ = writeln!(out, "    // Function: {sig}");
            }
            let hex = hex::encode(sel.value);
            let _ = writeln!(out, "    // Selector: 0x{hex}");
            let _ = writeln!(out, "    function func_{hex}() public {{");
            out.push_str(NO_BODY);
            out.push_str("\n    }\n\n");
        }
    }

    out.push_str("    // Fallback function\n");
    out.push_str("    fallback() external payable {\n");
    out.push_str(NO_BODY);
    out.push_str("\n    }\n\n");
    out.push_str("    // Receive function\n");
    out.push_str("    receive() external payable {}\n");
    out.push_str("}\n\n");

    let _ = writeln!(out, "/*\nDisassembled Opcodes (first {LISTING_LIMIT}):");
    let mut listing = Disassembler::new(code);
    for inst in listing.by_ref().take(LISTING_LIMIT) {
        let _ = writeln!(out, "{inst}");
    }
    if listing.next().is_some() {
        out.push_str(TRUNCATION_MARKER);
        out.push('\n');
    }
    out.push_str("*/\n");
    out
}
