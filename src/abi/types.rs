//! ABI type tags and decoded values.

use crate::utils::helpers::format_token_amount;
use primitive_types::U256;
use serde_json::{json, Value};
use std::fmt;

/// A parameter type the decoder understands.
///
/// Anything outside this set parses to [`AbiType::Unsupported`] and decodes as
/// its raw head words.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Address,
    Bool,
    /// `uintN`, width in bits.
    Uint(u16),
    /// Dynamic `bytes`.
    Bytes,
    String,
    /// `bytesN`, width in bytes.
    FixedBytes(u8),
    /// Single-level dynamic array `T[]`.
    Array(Box<AbiType>),
    Unsupported(String),
}

impl AbiType {
    /// Parse a canonical type string. Never fails.
    pub fn parse(ty: &str) -> AbiType {
        let ty = ty.trim();
        if let Some(inner) = ty.strip_suffix("[]") {
            return match AbiType::parse(inner) {
                AbiType::Array(_) | AbiType::Unsupported(_) => AbiType::Unsupported(ty.to_string()),
                elem => AbiType::Array(Box::new(elem)),
            };
        }
        match ty {
            "address" => AbiType::Address,
            "bool" => AbiType::Bool,
            "bytes" => AbiType::Bytes,
            "string" => AbiType::String,
            "uint" => AbiType::Uint(256),
            _ => {
                if let Some(bits) = ty.strip_prefix("uint").and_then(|w| w.parse::<u16>().ok()) {
                    if bits > 0 && bits <= 256 && bits % 8 == 0 {
                        return AbiType::Uint(bits);
                    }
                } else if let Some(n) = ty.strip_prefix("bytes").and_then(|w| w.parse::<u8>().ok()) {
                    if (1..=32).contains(&n) {
                        return AbiType::FixedBytes(n);
                    }
                }
                AbiType::Unsupported(ty.to_string())
            }
        }
    }

    /// Dynamic types store an offset in the head and their data in the tail.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, AbiType::Bytes | AbiType::String | AbiType::Array(_))
    }

    /// Number of 32-byte head words this type occupies in a parameter list.
    ///
    /// Static tuples and fixed-size arrays are laid out inline, so an
    /// unsupported `(address,uint256)` takes two words and `uint256[3]` three.
    /// `None` when the layout of an unsupported type cannot be worked out.
    pub fn head_words(&self) -> Option<usize> {
        match self {
            AbiType::Unsupported(raw) => match layout(raw)? {
                Layout::Static(words) => Some(words),
                Layout::Dynamic => Some(1),
            },
            _ => Some(1),
        }
    }
}

enum Layout {
    Static(usize),
    Dynamic,
}

fn layout(ty: &str) -> Option<Layout> {
    let ty = ty.trim();
    if let Some(rest) = ty.strip_suffix(']') {
        let open = rest.rfind('[')?;
        let (inner, dim) = (&rest[..open], &rest[open + 1..]);
        let elem = layout(inner)?;
        if dim.is_empty() {
            return Some(Layout::Dynamic);
        }
        let count: usize = dim.parse().ok()?;
        return match elem {
            Layout::Static(words) => Some(Layout::Static(words.checked_mul(count)?)),
            Layout::Dynamic => Some(Layout::Dynamic),
        };
    }
    if let Some(body) = ty.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let mut total = 0usize;
        let mut dynamic = false;
        for component in split_components(body)? {
            match layout(component)? {
                Layout::Static(words) => total = total.checked_add(words)?,
                Layout::Dynamic => dynamic = true,
            }
        }
        return Some(if dynamic { Layout::Dynamic } else { Layout::Static(total) });
    }
    match ty {
        "bytes" | "string" => Some(Layout::Dynamic),
        "address" | "bool" | "function" => Some(Layout::Static(1)),
        _ if is_word_sized(ty) => Some(Layout::Static(1)),
        _ => None,
    }
}

/// `uintN`, `intN`, `bytesN`, `fixedMxN`, `ufixedMxN`.
fn is_word_sized(ty: &str) -> bool {
    let suffix = ["uint", "int", "bytes", "ufixed", "fixed"]
        .iter()
        .find_map(|prefix| ty.strip_prefix(prefix));
    match suffix {
        Some(rest) => rest.chars().all(|c| c.is_ascii_digit() || c == 'x'),
        None => false,
    }
}

/// Split a tuple body on top-level commas. `None` on unbalanced parentheses.
fn split_components(body: &str) -> Option<Vec<&str>> {
    if body.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&body[start..]);
    Some(parts)
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => f.write_str("address"),
            AbiType::Bool => f.write_str("bool"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::FixedBytes(n) => write!(f, "bytes{n}"),
            AbiType::Array(elem) => write!(f, "{elem}[]"),
            AbiType::Unsupported(raw) => f.write_str(raw),
        }
    }
}

/// A decoded parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    /// Checksummed (or, failing that, lower-case) `0x` address.
    Address(String),
    Bool(bool),
    Uint(U256),
    Bytes(Vec<u8>),
    String(String),
    FixedBytes(Vec<u8>),
    /// Elements that failed to decode are `None`.
    Array(Vec<Option<AbiValue>>),
    /// Head word of a type the decoder does not interpret.
    Raw(Vec<u8>),
}

impl AbiValue {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&str> {
        match self {
            AbiValue::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Plain JSON rendering; integers become decimal strings.
    pub fn to_json(&self) -> Value {
        match self {
            AbiValue::Address(a) => json!(a),
            AbiValue::Bool(b) => json!(b),
            AbiValue::Uint(v) => json!(v.to_string()),
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) | AbiValue::Raw(b) => {
                json!(format!("0x{}", hex::encode(b)))
            }
            AbiValue::String(s) => json!(s),
            AbiValue::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.as_ref().map_or(Value::Null, AbiValue::to_json))
                    .collect(),
            ),
        }
    }

    /// JSON rendering that pairs every `uint256`, and every element of a
    /// `uint*[]`, with its 18-decimal display form.
    pub fn to_display_json(&self, ty: &AbiType) -> Value {
        match (self, ty) {
            (AbiValue::Uint(v), AbiType::Uint(256)) => amount_json(*v),
            (AbiValue::Array(items), AbiType::Array(elem)) if matches!(**elem, AbiType::Uint(_)) => {
                let amounts = items.iter().map(|item| match item {
                    Some(AbiValue::Uint(v)) => amount_json(*v),
                    _ => Value::Null,
                });
                Value::Array(amounts.collect())
            }
            (AbiValue::Array(items), AbiType::Array(elem)) => Value::Array(
                items
                    .iter()
                    .map(|item| item.as_ref().map_or(Value::Null, |v| v.to_display_json(elem)))
                    .collect(),
            ),
            _ => self.to_json(),
        }
    }
}

fn amount_json(v: U256) -> Value {
    json!({
        "raw": v.to_string(),
        "formatted": format_token_amount(v),
    })
}
