//! General helper utilities: hex intake, hashing, address and amount display.

use crate::errors::{bounded, LoaderError};
use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// Decimals assumed when formatting `uint256` amounts for display.
pub const DISPLAY_DECIMALS: usize = 18;

/// Strip surrounding whitespace and an optional `0x` / `0X` prefix.
pub fn strip_hex_prefix(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Decode a hex string (with or without `0x` prefix) into bytes.
///
/// Odd-length and non-hex input is rejected, never padded or coerced.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, LoaderError> {
    let digits = strip_hex_prefix(input);
    if digits.len() % 2 != 0 {
        return Err(LoaderError::OddLength(digits.len()));
    }
    hex::decode(digits).map_err(|_| LoaderError::InvalidHex(bounded(digits)))
}

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// 4-byte function selector of a canonical signature such as `transfer(address,uint256)`.
pub fn selector_of(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Render a 4-byte selector as `0x`-prefixed lower-case hex.
pub fn selector_hex(selector: &[u8; 4]) -> String {
    format!("0x{}", hex::encode(selector))
}

/// EIP-55 checksum rendering of a hex address.
///
/// Returns `None` if `address` is not 20 bytes of hex.
pub fn to_checksum_address(address: &str) -> Option<String> {
    let digits = strip_hex_prefix(address);
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let lower = digits.to_ascii_lowercase();
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            hash[i / 2] >> 4
        } else {
            hash[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Some(out)
}

/// Checksummed rendering of raw address bytes, falling back to lower-case hex.
pub fn format_address(bytes: &[u8]) -> String {
    let raw = format!("0x{}", hex::encode(bytes));
    to_checksum_address(&raw).unwrap_or(raw)
}

/// Format a raw token amount assuming [`DISPLAY_DECIMALS`] decimals.
///
/// Whole amounts print without a fraction, amounts of one unit or more keep
/// six rounded decimals, and sub-unit amounts print the exact fraction with
/// trailing zeros removed.
pub fn format_token_amount(amount: U256) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }
    let unit = U256::exp10(DISPLAY_DECIMALS);
    let whole = amount / unit;
    let rem = amount % unit;

    if whole.is_zero() {
        let frac = format!("{:0>width$}", rem.to_string(), width = DISPLAY_DECIMALS);
        return format!("0.{}", frac.trim_end_matches('0'));
    }
    if rem.is_zero() {
        return whole.to_string();
    }

    let scale = U256::exp10(DISPLAY_DECIMALS - 6);
    let mut micro = (rem + scale / U256::from(2u64)) / scale;
    let mut whole = whole;
    if micro >= U256::exp10(6) {
        // Only reachable when the fraction rounds up to a full unit.
        micro = U256::zero();
        whole = whole.saturating_add(U256::one());
    }
    format!("{whole}.{:0>6}", micro.to_string())
}
