//! Integration tests: backend chain, fallback rendering and output formats.

use ostia::decompiler::{
    decompile_bytecode, decompile_or_report, CommandBackend, Decompiler, DecompilerBackend, DecompilerConfig, Origin,
    OutputFormat, StageFormat, FILE_PLACEHOLDER,
};
use ostia::fallback::{LISTING_LIMIT, TRUNCATION_MARKER};
use ostia::loader::Bytecode;
use ostia::registry::SignatureRegistry;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// ERC20-ish dispatcher prefix followed by a storage read.
const TOKEN_FRAGMENT: &str = "6080604052348015600f57600080fd5b5060043610\
                              6370a08231146100385780\
                              63a9059cbb14610042575b\
                              600354600052602060005ff3";

fn offline(format: OutputFormat) -> DecompilerConfig {
    DecompilerConfig {
        external: false,
        format,
        ..Default::default()
    }
}

/// A backend that runs `body` as a shell script with the staged file as `$1`.
fn scripted(dir: &Path, name: &str, body: &str, stage: StageFormat) -> CommandBackend {
    let script: PathBuf = dir.join(format!("{name}.sh"));
    std::fs::write(&script, format!("{body}\n")).unwrap();
    CommandBackend {
        name: name.into(),
        program: "/bin/sh".into(),
        args: vec![script.to_string_lossy().into_owned(), FILE_PLACEHOLDER.into()],
        stage,
        file_name: "code.hex".into(),
        timeout: Duration::from_secs(30),
    }
}

fn run_with(backends: Vec<Box<dyn DecompilerBackend>>, config: DecompilerConfig, hex: &str) -> ostia::decompiler::Decompilation {
    let registry = SignatureRegistry::seeded();
    Decompiler::with_backends(config, backends, &registry)
        .decompile(&Bytecode::from_hex(hex).unwrap())
        .unwrap()
}

// ---- Fallback path ----

#[test]
fn test_no_backends_uses_fallback() {
    let out = run_with(Vec::new(), DecompilerConfig::default(), TOKEN_FRAGMENT);
    assert_eq!(out.origin, Origin::Fallback);
    assert!(out.text.contains("// Function: balanceOf(address)"));
    assert!(out.text.contains("// Function: transfer(address,uint256)"));
    assert!(out.text.contains("// slot: 0x3"));
    assert!(out.text.contains("fallback() external payable"));
}

#[test]
fn test_unavailable_backend_skipped() {
    let missing = CommandBackend {
        program: "ostia-no-such-decompiler".into(),
        ..CommandBackend::heimdall()
    };
    assert!(!missing.is_available());
    let out = run_with(vec![Box::new(missing)], DecompilerConfig::default(), "6001");
    assert_eq!(out.origin, Origin::Fallback);
}

#[test]
fn test_fallback_truncation_marker() {
    let long = "5b".repeat(LISTING_LIMIT + 20);
    let out = decompile_bytecode(&long, &offline(OutputFormat::Text)).unwrap();
    assert!(out.text.contains(TRUNCATION_MARKER));

    let short = "5b".repeat(LISTING_LIMIT);
    let out = decompile_bytecode(&short, &offline(OutputFormat::Text)).unwrap();
    assert!(!out.text.contains(TRUNCATION_MARKER));
}

#[test]
fn test_report_is_attached_to_fallback() {
    let out = decompile_bytecode(TOKEN_FRAGMENT, &offline(OutputFormat::Text)).unwrap();
    assert_eq!(out.report.selectors.len(), 2);
    assert_eq!(out.report.storage_slots.len(), 1);
}

#[test]
fn test_json_output() {
    let out = decompile_bytecode(TOKEN_FRAGMENT, &offline(OutputFormat::Json)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&out.text).unwrap();
    assert_eq!(json["origin"], "fallback");
    assert_eq!(json["heuristics"]["selectors"][1]["selector"], "0xa9059cbb");
    assert!(json["source"].as_str().unwrap().contains("contract DecompiledContract"));
}

#[test]
fn test_asm_output() {
    let out = decompile_bytecode("0x6001600201", &offline(OutputFormat::Asm)).unwrap();
    assert_eq!(out.text, "0x0000 60 PUSH1 0x01\n0x0002 60 PUSH1 0x02\n0x0004 01 ADD");
}

// ---- External backends (driven through /bin/sh) ----

#[cfg(unix)]
mod external {
    use super::*;

    #[test]
    fn test_backend_sees_staged_hex() {
        let dir = tempfile::tempdir().unwrap();
        let backend = scripted(dir.path(), "fake", "cat \"$1\"", StageFormat::Hex);
        let out = run_with(vec![Box::new(backend)], DecompilerConfig::default(), "0x6001");
        assert_eq!(out.origin, Origin::External("fake".into()));
        assert_eq!(out.text, "// Decompiled with fake\n\n6001");
    }

    #[test]
    fn test_prefixed_hex_staging() {
        let dir = tempfile::tempdir().unwrap();
        let backend = scripted(dir.path(), "fake", "cat \"$1\"", StageFormat::PrefixedHex);
        let out = run_with(vec![Box::new(backend)], DecompilerConfig::default(), "6001");
        assert!(out.text.ends_with("0x6001"));
    }

    #[test]
    fn test_failures_fall_through_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let backends: Vec<Box<dyn DecompilerBackend>> = vec![
            Box::new(scripted(dir.path(), "failing", "echo partial; exit 2", StageFormat::Hex)),
            Box::new(scripted(dir.path(), "silent", "true", StageFormat::Hex)),
            Box::new(scripted(dir.path(), "garbled", "printf '\\377\\376'", StageFormat::Hex)),
            Box::new(scripted(dir.path(), "good", "echo 'contract Good {}'", StageFormat::Hex)),
            Box::new(scripted(dir.path(), "later", "echo 'never used'", StageFormat::Hex)),
        ];
        let out = run_with(backends, DecompilerConfig::default(), "00");
        assert_eq!(out.origin, Origin::External("good".into()));
        assert!(out.text.contains("contract Good {}"));
        assert!(!out.text.contains("never used"));
    }

    #[test]
    fn test_timeout_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let slow = scripted(dir.path(), "slow", "echo started; sleep 30", StageFormat::Hex);
        let config = DecompilerConfig {
            timeout_secs: Some(1),
            ..Default::default()
        };
        let started = std::time::Instant::now();
        let out = run_with(vec![Box::new(slow)], config, "00");
        assert_eq!(out.origin, Origin::Fallback);
        assert!(!out.text.contains("started"));
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[test]
    fn test_staging_removed_after_run() {
        let dir = tempfile::tempdir().unwrap();
        let backend = scripted(dir.path(), "where", "echo \"$1\"", StageFormat::Binary);
        let out = run_with(vec![Box::new(backend)], DecompilerConfig::default(), "00");
        let staged = out.text.lines().last().unwrap().trim().to_string();
        assert!(staged.ends_with("code.hex"));
        assert!(!Path::new(&staged).exists());
    }

    #[test]
    fn test_no_external_flag_skips_backends() {
        let dir = tempfile::tempdir().unwrap();
        let backend = scripted(dir.path(), "fake", "echo hi", StageFormat::Hex);
        let out = run_with(vec![Box::new(backend)], offline(OutputFormat::Text), "00");
        assert_eq!(out.origin, Origin::Fallback);
    }
}

// ---- Outer boundary ----

#[test]
fn test_or_report_passes_success_through() {
    let text = decompile_or_report("00", &offline(OutputFormat::Text));
    assert!(text.contains("contract DecompiledContract"));
}

#[test]
fn test_or_report_bounds_diagnostic() {
    let bad = format!("0x{}", "g".repeat(500));
    let text = decompile_or_report(&bad, &offline(OutputFormat::Text));
    assert!(text.starts_with("Decompilation failed:"));
    assert!(text.len() < 400);
}
