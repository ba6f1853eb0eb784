//! Head/tail ABI parameter decoding.
//!
//! Supported parameters own one 32-byte head word. Static values live in that
//! word; dynamic values store a byte offset (relative to the start of the
//! enclosing blob) to a tail region that begins with a length word. Static
//! tuples and fixed-size arrays span several head words and come back raw.
//!
//! Decoding degrades per parameter: a truncated or malformed slot yields
//! `None` and the remaining parameters are still decoded. Once a parameter's
//! head width is unknown, every later parameter is `None`.

use super::types::{AbiType, AbiValue};
use crate::utils::helpers::format_address;
use primitive_types::U256;

pub const WORD: usize = 32;

/// Decode `data` (parameters only, no selector) against `types`.
///
/// The result always has one entry per type.
pub fn decode_parameters(data: &[u8], types: &[AbiType]) -> Vec<Option<AbiValue>> {
    let mut cursor = Some(0usize);
    types
        .iter()
        .enumerate()
        .map(|(i, ty)| {
            let Some(head) = cursor else {
                log::debug!("parameter {i} ({ty}) follows a parameter of unknown width");
                return None;
            };
            cursor = ty
                .head_words()
                .and_then(|words| words.checked_mul(WORD))
                .and_then(|width| head.checked_add(width));
            let value = decode_at(data, 0, head, ty);
            if value.is_none() {
                log::debug!("parameter {i} ({ty}) could not be decoded");
            }
            value
        })
        .collect()
}

/// Decode one value whose head word sits at `head`. Offsets of dynamic values
/// are relative to `base`.
fn decode_at(data: &[u8], base: usize, head: usize, ty: &AbiType) -> Option<AbiValue> {
    if let AbiType::Unsupported(_) = ty {
        return raw_head(data, head, ty);
    }
    let word = read_word(data, head)?;
    match ty {
        AbiType::Address => Some(AbiValue::Address(format_address(&word[12..]))),
        AbiType::Uint(_) => Some(AbiValue::Uint(U256::from_big_endian(word))),
        AbiType::Bool => Some(AbiValue::Bool(word.iter().any(|&b| b != 0))),
        AbiType::FixedBytes(n) => Some(AbiValue::FixedBytes(word[..*n as usize].to_vec())),
        AbiType::Bytes | AbiType::String | AbiType::Array(_) => {
            let start = base.checked_add(word_to_offset(word, data.len())?)?;
            decode_tail(data, start, ty)
        }
        AbiType::Unsupported(_) => None,
    }
}

/// All head words of an unsupported type, uninterpreted. When the width is
/// unknown only the first word is returned.
fn raw_head(data: &[u8], head: usize, ty: &AbiType) -> Option<AbiValue> {
    let width = ty.head_words().unwrap_or(1).checked_mul(WORD)?;
    let raw = data.get(head..head.checked_add(width)?)?;
    Some(AbiValue::Raw(raw.to_vec()))
}

/// Decode the tail region of a dynamic value starting at its length word.
fn decode_tail(data: &[u8], start: usize, ty: &AbiType) -> Option<AbiValue> {
    let len = word_to_offset(read_word(data, start)?, data.len())?;
    let body = start.checked_add(WORD)?;

    match ty {
        AbiType::Bytes => {
            let payload = data.get(body..body.checked_add(len)?)?;
            Some(AbiValue::Bytes(payload.to_vec()))
        }
        AbiType::String => {
            let payload = data.get(body..body.checked_add(len)?)?;
            Some(AbiValue::String(String::from_utf8_lossy(payload).into_owned()))
        }
        AbiType::Array(elem) => {
            // Every element owns one head word; refuse lengths the data cannot hold.
            let heads = len.checked_mul(WORD)?;
            if body.checked_add(heads)? > data.len() {
                return None;
            }
            let items = (0..len)
                .map(|i| decode_at(data, body, body + i * WORD, elem))
                .collect();
            Some(AbiValue::Array(items))
        }
        _ => None,
    }
}

fn read_word(data: &[u8], at: usize) -> Option<&[u8]> {
    data.get(at..at.checked_add(WORD)?)
}

/// Interpret a word as an offset or length; anything past `limit` is malformed.
fn word_to_offset(word: &[u8], limit: usize) -> Option<usize> {
    let value = U256::from_big_endian(word);
    if value > U256::from(limit as u64) {
        return None;
    }
    Some(value.low_u64() as usize)
}
