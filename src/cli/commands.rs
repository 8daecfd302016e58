use std::path::{Path, PathBuf};

use tracing::warn;

use crate::cli::config::Mode;
use crate::cli::error::CompressError;
use crate::domain::domain_model::Domain;
use crate::domain::scorer::score_domains_traced;
use crate::engine::compressor::Compressor;
use crate::instruction::keywords::instruction_keywords;

/// Characters of the raw dump echoed into each output file.
const RAW_PREVIEW_CHARS: usize = 500;

const RULE: &str = "============================================================";

/// One sample as found on disk.
#[derive(Debug, Clone)]
pub struct Sample {
    pub domain: String,
    pub id: u32,
    pub a11y: String,
    pub instruction: Option<String>,
}

// ============================================================================
// compress command
// ============================================================================

/// Compress every requested sample of `domain` with one session, so view
/// smoothing carries over from one id to the next.
///
/// A sample that cannot be loaded or written is reported and skipped. The
/// command fails only when no sample produced an output file.
pub fn cmd_compress(
    domain: &str,
    ids: &[u32],
    mode: Mode,
    samples_root: &Path,
    output_dir: &Path,
    compressor: &mut Compressor,
    verbose: u8,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let plugin_domain = domain.parse::<Domain>().unwrap_or_else(|e| {
        if verbose > 0 {
            eprintln!("{}; using generic plug-in", e);
        }
        Domain::Generic
    });

    std::fs::create_dir_all(output_dir).map_err(|source| CompressError::Io {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    let mut last_error = None;
    for &id in ids {
        let sample = SampleRun {
            domain,
            plugin_domain,
            id,
            mode,
            samples_root,
            output_dir,
            verbose,
        };
        match sample.run(compressor) {
            Ok(path) => written.push(path),
            Err(e) => {
                warn!(domain, id, error = %e, "skipping sample");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if written.is_empty() => Err(e.into()),
        _ => Ok(written),
    }
}

/// One id of a `cmd_compress` run.
struct SampleRun<'a> {
    domain: &'a str,
    plugin_domain: Domain,
    id: u32,
    mode: Mode,
    samples_root: &'a Path,
    output_dir: &'a Path,
    verbose: u8,
}

impl SampleRun<'_> {
    fn run(&self, compressor: &mut Compressor) -> Result<PathBuf, CompressError> {
        let (domain, id, mode) = (self.domain, self.id, self.mode);
        let sample = load_sample(self.samples_root, domain, id)?;

        let instruction = match mode {
            Mode::Instruction => {
                if sample.instruction.is_none() {
                    eprintln!("Sample {} has no instruction.txt; running as baseline", id);
                }
                sample.instruction.as_deref()
            }
            Mode::Baseline => None,
        };
        let keywords = instruction.map(instruction_keywords).unwrap_or_default();

        println!("{}", RULE);
        println!("  SAMPLE: domain={}, id={}, mode={}", domain, id, mode);
        println!("{}", RULE);

        let elements = compressor.reconstruct(&sample.a11y);
        let detected = score_domains_traced(&elements, compressor.trace()).best;
        println!("DETECTED DOMAIN: {}", detected);

        let compression = compressor.compress_as(self.plugin_domain, &elements, &keywords);
        let text = compression.text();

        if self.verbose > 0 {
            eprintln!(
                "  {} elements, {} sections, modal={}{}",
                elements.len(),
                compression.sections().len(),
                compression.modal.len(),
                if compression.modal_suppressed { " (suppressed)" } else { "" }
            );
        }

        println!("\n=== COMPRESSED A11Y ===");
        println!("{}", text);

        let path = self.output_dir.join(output_filename(domain, id, detected, mode));
        let report = render_output(&sample, instruction, detected, mode, &text);
        std::fs::write(&path, report).map_err(|source| CompressError::Io {
            path: path.clone(),
            source,
        })?;

        println!("\nSaved to: {}", path.display());
        Ok(path)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Read `<root>/<domain>/<id>/a11y.txt` and the optional `instruction.txt`.
pub fn load_sample(root: &Path, domain: &str, id: u32) -> Result<Sample, CompressError> {
    let dir = root.join(domain).join(id.to_string());
    let a11y_path = dir.join("a11y.txt");

    if !a11y_path.exists() {
        return Err(CompressError::SampleNotFound {
            domain: domain.to_string(),
            id: id.to_string(),
            path: a11y_path,
        });
    }

    let a11y = std::fs::read_to_string(&a11y_path).map_err(|source| CompressError::Io {
        path: a11y_path.clone(),
        source,
    })?;

    let inst_path = dir.join("instruction.txt");
    let instruction = match std::fs::read_to_string(&inst_path) {
        Ok(text) => Some(text.trim().to_string()).filter(|t| !t.is_empty()),
        Err(_) => None,
    };

    Ok(Sample {
        domain: domain.to_string(),
        id,
        a11y,
        instruction,
    })
}

pub fn output_filename(domain: &str, id: u32, detected: Domain, mode: Mode) -> String {
    format!("{}_{}_{}_{}.txt", sanitize_filename(domain), id, detected, mode)
}

/// Output file body: header block, raw preview, instruction, then the
/// compressed text.
pub fn render_output(
    sample: &Sample,
    instruction: Option<&str>,
    detected: Domain,
    mode: Mode,
    compressed: &str,
) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "SAMPLE: domain={}, id={} ({}-{}), mode={}\n",
        sample.domain, sample.id, sample.domain, sample.id, mode
    ));
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str(&format!("ORIGINAL LINEAR A11Y (Head {} chars):\n", RAW_PREVIEW_CHARS));
    let preview: String = sample.a11y.chars().take(RAW_PREVIEW_CHARS).collect();
    out.push_str(&preview);
    out.push_str("...\n\n");

    if let Some(inst) = instruction {
        out.push_str("INSTRUCTION:\n");
        out.push_str(inst.trim());
        out.push_str("\n\n");
    }

    out.push_str(&format!("DETECTED DOMAIN: {}\n\n", detected));
    out.push_str("=== COMPRESSED A11Y ===\n");
    out.push_str(compressed.trim());
    out.push('\n');
    out
}

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase()
}
