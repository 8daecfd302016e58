use std::fmt;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::cli::error::CompressError;
use crate::engine::compressor::CompressOptions;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "a11y-compressor",
    version,
    about = "Compress linearized accessibility trees into agent-sized text"
)]
pub struct Cli {
    /// Application domain; selects the sample folder and the plug-in
    pub domain: String,

    /// Sample ids: N or N,M,... (a non-numeric value is taken as the mode)
    pub ids: Option<String>,

    /// Mode: baseline or instruction
    pub mode: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: a11y-compressor.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Root of the <domain>/<id>/a11y.txt sample tree
    #[arg(long)]
    pub samples_dir: Option<String>,

    /// Directory for compressed outputs
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Append the score/decision trace as JSONL to this file
    #[arg(long)]
    pub trace: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Baseline,
    Instruction,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Baseline => "baseline",
            Mode::Instruction => "instruction",
        }
    }

    /// Unknown modes warn and fall back to baseline.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "baseline" => Mode::Baseline,
            "instruction" => Mode::Instruction,
            other => {
                eprintln!("Warning: unknown mode '{}', using '{}'", other, Mode::Baseline);
                Mode::Baseline
            }
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_SAMPLE_ID: u32 = 1;

/// Parse `N` or `N,M,...`.
pub fn parse_ids(raw: &str) -> Result<Vec<u32>, CompressError> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .map_err(|_| CompressError::Config(format!("invalid sample id '{}'", s)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if ids.is_empty() {
        return Err(CompressError::Config(format!("no sample ids in '{}'", raw)));
    }
    Ok(ids)
}

/// Resolve the two optional positionals. A first value that is not an id
/// list is the mode; malformed id lists fall back to the default id.
pub fn resolve_samples(ids: Option<&str>, mode: Option<&str>) -> (Vec<u32>, Mode) {
    match (ids, mode) {
        (None, _) => (vec![DEFAULT_SAMPLE_ID], Mode::Baseline),
        (Some(first), mode) => {
            let looks_like_ids = first.contains(',') || first.chars().all(|c| c.is_ascii_digit());
            if looks_like_ids {
                let ids = parse_ids(first).unwrap_or_else(|e| {
                    eprintln!("Warning: {}", e);
                    vec![DEFAULT_SAMPLE_ID]
                });
                (ids, mode.map(Mode::parse_lenient).unwrap_or_default())
            } else {
                (vec![DEFAULT_SAMPLE_ID], Mode::parse_lenient(first))
            }
        }
    }
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `a11y-compressor.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: CompressOptions,
    #[serde(default)]
    pub samples: SamplesConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplesConfig {
    #[serde(default = "default_samples_root")]
    pub root: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            root: default_samples_root(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceConfig {
    pub path: Option<String>,
}

fn default_samples_root() -> String { "demo_samples".to_string() }
fn default_output_dir() -> String { "demo_outputs".to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("a11y-compressor.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}
