//! Solidity → ABI via `solc --combined-json abi`.
//!
//! The compiler is either a native `solc` binary or the `ethereum/solc`
//! Docker image pinned to the version named by the source's pragma.

use crate::abi::json::AbiItem;
use crate::errors::{bounded, AbiError, BackendError};
use crate::utils::process::StagingArea;
use serde_json::Value;
use std::ffi::OsString;
use std::time::Duration;

pub const DEFAULT_SOLIDITY_VERSION: &str = "0.8.17";
pub const DOCKER_IMAGE: &str = "ethereum/solc";
const SOURCE_FILE: &str = "contract.sol";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolcRunner {
    /// A `solc` executable, by name or path.
    Native { program: String },
    /// `docker run` against `<image>:<version>`.
    Docker { image: String },
}

#[derive(Debug, Clone)]
pub struct SolcConfig {
    pub runner: SolcRunner,
    pub timeout_secs: u64,
}

impl Default for SolcConfig {
    fn default() -> Self {
        Self {
            runner: SolcRunner::Docker {
                image: DOCKER_IMAGE.to_string(),
            },
            timeout_secs: 120,
        }
    }
}

/// Heuristic check used before attempting a compile.
pub fn looks_like_solidity(source: &str) -> bool {
    source.contains("contract") && source.contains("function")
}

/// Pick a concrete compiler version from the `pragma solidity` constraint.
///
/// `^0.8.0` → `0.8.0`, `>=0.7.0 <0.9.0` → `0.7.0`, `0.8.7` → `0.8.7`.
/// No pragma, or nothing that looks like a version, gives the default.
pub fn extract_solidity_version(source: &str) -> String {
    let Some(constraint) = pragma_constraint(source) else {
        return DEFAULT_SOLIDITY_VERSION.to_string();
    };
    let search_from = if constraint.contains(">=") && constraint.contains('<') {
        constraint.find(">=").map(|i| i + 2).unwrap_or(0)
    } else {
        0
    };
    constraint
        .get(search_from..)
        .and_then(first_version)
        .unwrap_or(DEFAULT_SOLIDITY_VERSION)
        .to_string()
}

/// Text between `pragma solidity` and the next `;`.
fn pragma_constraint(source: &str) -> Option<&str> {
    let mut rest = source;
    while let Some(at) = rest.find("pragma") {
        let after = &rest[at + "pragma".len()..];
        let trimmed = after.trim_start();
        if after.len() != trimmed.len() {
            if let Some(body) = trimmed.strip_prefix("solidity") {
                if body.starts_with(char::is_whitespace) {
                    let end = body.find(';')?;
                    return Some(body[..end].trim());
                }
            }
        }
        rest = after;
    }
    None
}

/// First `N.N.N` run in `text`.
fn first_version(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            let mut dots = 0;
            let mut last_was_digit = true;
            i += 1;
            while i < bytes.len() {
                match bytes[i] {
                    b'0'..=b'9' => last_was_digit = true,
                    b'.' if last_was_digit && dots < 2 => {
                        dots += 1;
                        last_was_digit = false;
                    }
                    _ => break,
                }
                i += 1;
            }
            if dots == 2 && last_was_digit {
                return Some(&text[start..i]);
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Compile `source` and return the union of every contract's ABI items.
pub fn compile_abi(source: &str, config: &SolcConfig) -> Result<Vec<AbiItem>, AbiError> {
    let stage = StagingArea::new()?;
    let file = stage.write(SOURCE_FILE, source.as_bytes())?;
    let timeout = Duration::from_secs(config.timeout_secs);

    let (program, args): (OsString, Vec<OsString>) = match &config.runner {
        SolcRunner::Native { program } => (
            program.into(),
            vec!["--combined-json".into(), "abi".into(), file.into_os_string()],
        ),
        SolcRunner::Docker { image } => {
            let version = extract_solidity_version(source);
            log::info!("compiling with {image}:{version}");
            let mut mount = OsString::from(stage.path());
            mount.push(":/sources");
            (
                "docker".into(),
                vec![
                    "run".into(),
                    "--rm".into(),
                    "-v".into(),
                    mount,
                    format!("{image}:{version}").into(),
                    "--combined-json".into(),
                    "abi".into(),
                    format!("/sources/{SOURCE_FILE}").into(),
                ],
            )
        }
    };

    let stdout = stage.run(&program, &args, timeout)?;
    let text = String::from_utf8(stdout)
        .map_err(|_| BackendError::InvalidUtf8(program.to_string_lossy().into_owned()))?;
    parse_combined_json(&text)
}

/// Extract ABI items from `solc --combined-json abi` output.
///
/// Older compilers emit each `abi` as a JSON-encoded string, newer ones as an
/// inline array; both are accepted.
pub fn parse_combined_json(output: &str) -> Result<Vec<AbiItem>, AbiError> {
    let root: Value = serde_json::from_str(output)?;
    let contracts = root
        .get("contracts")
        .and_then(Value::as_object)
        .ok_or_else(|| AbiError::CompilerOutput(format!("no `contracts` object in {}", bounded(output))))?;

    let mut items = Vec::new();
    for (name, contract) in contracts {
        let abi = match contract.get("abi") {
            Some(Value::String(encoded)) => serde_json::from_str(encoded)?,
            Some(inline @ Value::Array(_)) => inline.clone(),
            Some(_) => return Err(AbiError::CompilerOutput(format!("malformed abi for {name}"))),
            None => Value::Array(Vec::new()),
        };
        let parsed: Vec<AbiItem> = serde_json::from_value(abi)?;
        log::debug!("{name}: {} ABI items", parsed.len());
        items.extend(parsed);
    }
    Ok(items)
}
