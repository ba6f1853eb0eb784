//! Decompilation orchestrator.
//!
//! Tries each available external decompiler in preference order and falls
//! back to the heuristic listing when none of them produces output.

use crate::errors::{bounded_to, BackendError};
use crate::fallback::render_fallback;
use crate::heuristics::{self, HeuristicReport};
use crate::loader::Bytecode;
use crate::registry::SignatureRegistry;
use crate::utils::process::{find_executable, StagingArea};
use anyhow::{Context, Result};
use serde_json::json;
use std::ffi::OsStr;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

/// Input prefix quoted in the top-level failure report.
pub const REPORT_PREFIX_LEN: usize = 100;

/// Placeholder in [`CommandBackend::args`] replaced by the staged file path.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Asm,
    Json,
}

/// Where the rendered text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    External(String),
    Fallback,
    Disassembly,
}

impl Origin {
    pub fn label(&self) -> &str {
        match self {
            Origin::External(name) => name,
            Origin::Fallback => "fallback",
            Origin::Disassembly => "disassembly",
        }
    }
}

/// Result of a decompilation run.
#[derive(Debug, Clone)]
pub struct Decompilation {
    pub text: String,
    pub origin: Origin,
    pub report: HeuristicReport,
}

/// Configuration for the decompiler.
#[derive(Debug, Clone)]
pub struct DecompilerConfig {
    /// Upper bound on any single backend run; `None` keeps each backend's own limit.
    pub timeout_secs: Option<u64>,
    /// Try external decompilers at all.
    pub external: bool,
    pub format: OutputFormat,
}

impl Default for DecompilerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            external: true,
            format: OutputFormat::Text,
        }
    }
}

/// An optional external decompiler.
pub trait DecompilerBackend: Send + Sync {
    /// Display name used in logs and in the output header.
    fn name(&self) -> &str;

    /// Whether the tool is installed. Unavailable backends are skipped silently.
    fn is_available(&self) -> bool;

    /// Decompile `code`, never running longer than `timeout`.
    fn decompile(&self, code: &Bytecode, timeout: Duration) -> Result<String, BackendError>;

    /// The backend's own time budget.
    fn default_timeout(&self) -> Duration;
}

/// How bytecode is written into the staging file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFormat {
    /// Lower-case hex, no prefix.
    Hex,
    /// `0x`-prefixed lower-case hex.
    PrefixedHex,
    /// Raw bytes.
    Binary,
}

impl StageFormat {
    fn encode(self, code: &Bytecode) -> Vec<u8> {
        match self {
            StageFormat::Hex => code.to_hex().into_bytes(),
            StageFormat::PrefixedHex => format!("0x{}", code.to_hex()).into_bytes(),
            StageFormat::Binary => code.as_bytes().to_vec(),
        }
    }
}

/// A decompiler driven through its command line.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    pub name: String,
    pub program: String,
    /// Arguments; [`FILE_PLACEHOLDER`] is replaced by the staged file path.
    pub args: Vec<String>,
    pub stage: StageFormat,
    pub file_name: String,
    pub timeout: Duration,
}

impl CommandBackend {
    pub fn heimdall() -> Self {
        Self {
            name: "heimdall-rs".into(),
            program: "heimdall".into(),
            args: ["decompile", FILE_PLACEHOLDER, "--output-format", "solidity"]
                .map(String::from)
                .to_vec(),
            stage: StageFormat::Hex,
            file_name: "contract.bin".into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn panoramix() -> Self {
        Self {
            name: "Panoramix".into(),
            program: "panoramix".into(),
            args: vec![FILE_PLACEHOLDER.into()],
            stage: StageFormat::PrefixedHex,
            file_name: "contract.hex".into(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn ethersplay() -> Self {
        Self {
            name: "ethersplay".into(),
            program: "ethersplay".into(),
            args: vec![FILE_PLACEHOLDER.into()],
            stage: StageFormat::Binary,
            file_name: "contract.bin".into(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl DecompilerBackend for CommandBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self) -> bool {
        find_executable(&self.program).is_some()
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }

    fn decompile(&self, code: &Bytecode, timeout: Duration) -> Result<String, BackendError> {
        let stage = StagingArea::new()?;
        let path = stage.write(&self.file_name, &self.stage.encode(code))?;
        let file = path.to_string_lossy();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(FILE_PLACEHOLDER, &file))
            .collect();

        let stdout = stage.run(OsStr::new(&self.program), &args, timeout)?;
        let text = String::from_utf8(stdout).map_err(|_| BackendError::InvalidUtf8(self.name.clone()))?;
        if text.trim().is_empty() {
            return Err(BackendError::EmptyOutput(self.name.clone()));
        }
        Ok(text)
    }
}

/// The built-in backends, in preference order.
pub fn default_backends() -> Vec<Box<dyn DecompilerBackend>> {
    vec![
        Box::new(CommandBackend::heimdall()),
        Box::new(CommandBackend::panoramix()),
        Box::new(CommandBackend::ethersplay()),
    ]
}

pub struct Decompiler<'r> {
    backends: Vec<Box<dyn DecompilerBackend>>,
    registry: &'r SignatureRegistry,
    config: DecompilerConfig,
}

impl Decompiler<'static> {
    /// Built-in backends and the global signature registry.
    pub fn new(config: DecompilerConfig) -> Self {
        Self::with_backends(config, default_backends(), SignatureRegistry::global())
    }
}

impl<'r> Decompiler<'r> {
    pub fn with_backends(
        config: DecompilerConfig,
        backends: Vec<Box<dyn DecompilerBackend>>,
        registry: &'r SignatureRegistry,
    ) -> Self {
        Self {
            backends,
            registry,
            config,
        }
    }

    fn timeout_for(&self, backend: &dyn DecompilerBackend) -> Duration {
        let own = backend.default_timeout();
        match self.config.timeout_secs {
            Some(cap) => own.min(Duration::from_secs(cap)),
            None => own,
        }
    }

    /// First successful backend output, prefixed with its name.
    fn try_external(&self, code: &Bytecode) -> Option<(String, String)> {
        for backend in &self.backends {
            let name = backend.name();
            if !backend.is_available() {
                log::debug!("{name} not installed, skipping");
                continue;
            }
            log::info!("trying {name}");
            match backend.decompile(code, self.timeout_for(backend.as_ref())) {
                Ok(text) => {
                    return Some((name.to_string(), format!("// Decompiled with {name}\n\n{text}")));
                }
                Err(e) => log::warn!("{name} declined: {e}"),
            }
        }
        None
    }

    pub fn decompile(&self, code: &Bytecode) -> Result<Decompilation> {
        let report = heuristics::recover(code.as_bytes(), self.registry);

        if self.config.format == OutputFormat::Asm {
            let text = code.disasm().join("\n");
            return Ok(Decompilation {
                text,
                origin: Origin::Disassembly,
                report,
            });
        }

        let external = if code.is_empty() {
            log::debug!("no code to hand to external decompilers");
            None
        } else if self.config.external {
            self.try_external(code)
        } else {
            None
        };
        let (origin, text) = match external {
            Some((name, text)) => (Origin::External(name), text),
            None => {
                log::info!("no external decompiler succeeded, using fallback listing");
                (Origin::Fallback, render_fallback(code.as_bytes(), &report))
            }
        };

        let text = match self.config.format {
            OutputFormat::Json => serde_json::to_string_pretty(&json!({
                "origin": origin.label(),
                "heuristics": report.to_json(),
                "source": text,
            }))
            .context("serialise to JSON")?,
            _ => text,
        };

        Ok(Decompilation { text, origin, report })
    }
}

/// Decompile raw bytecode (hex string).
pub fn decompile_bytecode(hex_code: &str, config: &DecompilerConfig) -> Result<Decompilation> {
    let code = Bytecode::from_hex(hex_code).context("failed to load bytecode")?;
    Decompiler::new(config.clone()).decompile(&code)
}

/// Like [`decompile_bytecode`], but every failure, including a panic inside
/// the pipeline, comes back as a short diagnostic text instead.
pub fn decompile_or_report(hex_code: &str, config: &DecompilerConfig) -> String {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| decompile_bytecode(hex_code, config)));
    let reason = match outcome {
        Ok(Ok(done)) => return done.text,
        Ok(Err(e)) => format!("{e:#}"),
        Err(_) => "internal error".to_string(),
    };
    format!(
        "Decompilation failed: {reason}\nRaw bytecode: {}",
        bounded_to(hex_code.trim(), REPORT_PREFIX_LEN)
    )
}
