//! Pattern scans over raw bytecode: probable function selectors and storage slots.
//!
//! Neither scan builds a control-flow graph. Selectors are taken from every
//! `PUSH4` immediate and slots from the nearest push preceding an
//! `SLOAD`/`SSTORE`, so results are candidates only. They are returned in a
//! [`HeuristicReport`], which nothing converts into a verified decode.

use crate::registry::{FunctionSignature, Selector, SignatureRegistry};
use crate::utils::helpers::selector_hex;
use crate::utils::opcodes::{self, PUSH4, SLOAD, SSTORE};
use primitive_types::U256;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// How far back from an `SLOAD`/`SSTORE` byte a slot push is searched for.
pub const SLOT_LOOKBACK: usize = 35;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSelector {
    pub value: Selector,
    /// Offset of the `PUSH4` opcode byte.
    pub offset: usize,
    /// Known signature, if the registry has one.
    pub signature: Option<String>,
}

impl FunctionSelector {
    pub fn hex(&self) -> String {
        selector_hex(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageSlotGuess {
    pub value: U256,
}

impl StorageSlotGuess {
    pub fn hex(&self) -> String {
        format!("0x{:x}", self.value)
    }
}

/// Advisory output of the pattern scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeuristicReport {
    /// One entry per `PUSH4` site, in code order, duplicates kept.
    pub selectors: Vec<FunctionSelector>,
    /// Distinct slot guesses, ascending by value.
    pub storage_slots: Vec<StorageSlotGuess>,
}

impl HeuristicReport {
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty() && self.storage_slots.is_empty()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "heuristic": true,
            "selectors": self.selectors.iter().map(|s| json!({
                "selector": s.hex(),
                "offset": s.offset,
                "signature": s.signature,
            })).collect::<Vec<_>>(),
            "storage_slots": self.storage_slots.iter().map(StorageSlotGuess::hex).collect::<Vec<_>>(),
        })
    }
}

/// Run both scans, attaching known signatures from `registry`.
pub fn recover(code: &[u8], registry: &SignatureRegistry) -> HeuristicReport {
    let known = registry.snapshot();
    let selectors = scan_selectors(code)
        .into_iter()
        .map(|(offset, value)| FunctionSelector {
            value,
            offset,
            signature: known.get(&value).map(FunctionSignature::canonical),
        })
        .collect();
    let storage_slots = scan_storage_slots(code).into_iter().collect();
    HeuristicReport {
        selectors,
        storage_slots,
    }
}

/// `(offset, selector)` for every `PUSH4` byte followed by four more bytes.
///
/// A matched `PUSH4` consumes its immediate; every other position advances a
/// single byte.
pub fn scan_selectors(code: &[u8]) -> Vec<(usize, Selector)> {
    let mut found = Vec::new();
    let mut i = 0;
    while i < code.len() {
        if code[i] == PUSH4 {
            if let Some(imm) = code.get(i + 1..i + 5) {
                let mut value = [0u8; 4];
                value.copy_from_slice(imm);
                found.push((i, value));
                i += 5;
                continue;
            }
        }
        i += 1;
    }
    log::debug!("selector scan: {} candidates", found.len());
    found
}

/// Distinct pushed values found within [`SLOT_LOOKBACK`] bytes before an
/// `SLOAD` or `SSTORE`.
///
/// Only the nearest push byte in the window counts, and only when its whole
/// immediate is present in `code`.
pub fn scan_storage_slots(code: &[u8]) -> BTreeSet<StorageSlotGuess> {
    let mut slots = BTreeSet::new();
    for (pos, &byte) in code.iter().enumerate() {
        if byte != SLOAD && byte != SSTORE {
            continue;
        }
        let floor = pos.saturating_sub(SLOT_LOOKBACK);
        let Some(push_at) = (floor..pos).rev().find(|&q| opcodes::is_push(code[q])) else {
            continue;
        };
        let width = opcodes::immediate_size(code[push_at]) as usize;
        if let Some(imm) = code.get(push_at + 1..push_at + 1 + width) {
            slots.insert(StorageSlotGuess {
                value: U256::from_big_endian(imm),
            });
        }
    }
    slots
}
