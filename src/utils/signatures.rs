//! Bundled function signatures.
//!
//! The seed table is embedded at compile time. Format: one line per entry,
//!   `f\t<hex_selector>\t<signature>\t<param_names>\n`
//! where `<param_names>` is a comma-separated list (may be empty).

use crate::registry::{FunctionSignature, Param};

static EMBEDDED_DB: &str = include_str!("../../data/signatures.tsv");

/// Split `name(type1,type2)` into its name and top-level parameter types.
///
/// Commas nested in tuple parentheses do not split.
pub fn split_signature(signature: &str) -> Option<(&str, Vec<&str>)> {
    let open = signature.find('(')?;
    let inner = signature.get(open + 1..)?.strip_suffix(')')?;
    let name = &signature[..open];
    if name.is_empty() {
        return None;
    }
    let mut types = Vec::new();
    if inner.is_empty() {
        return Some((name, types));
    }

    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                types.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    types.push(&inner[start..]);
    Some((name, types))
}

/// Parse the embedded table into signatures.
///
/// Malformed lines and lines whose selector disagrees with the signature hash
/// are skipped with a warning.
pub fn load_seed_signatures() -> Vec<FunctionSignature> {
    let mut out = Vec::new();
    for line in EMBEDDED_DB.lines() {
        let parts: Vec<&str> = line.splitn(4, '\t').collect();
        if parts.len() < 3 || parts[0] != "f" {
            continue;
        }
        let names: Vec<&str> = match parts.get(3) {
            Some(list) if !list.is_empty() => list.split(',').collect(),
            _ => Vec::new(),
        };
        let Some((name, types)) = split_signature(parts[2]) else {
            log::warn!("skipping malformed seed signature `{}`", parts[2]);
            continue;
        };
        let params = types
            .iter()
            .enumerate()
            .map(|(i, ty)| Param {
                name: names.get(i).map(|s| s.to_string()).unwrap_or_default(),
                kind: ty.to_string(),
            })
            .collect();
        let sig = FunctionSignature::new(name, params);
        if hex::encode(sig.selector) != parts[1] {
            log::warn!("seed selector {} does not match `{}`", parts[1], parts[2]);
            continue;
        }
        out.push(sig);
    }
    log::info!("Loaded {} seed function signatures", out.len());
    out
}
