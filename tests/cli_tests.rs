use std::path::Path;

use a11y_compressor::cli::commands::{
    cmd_compress, load_sample, output_filename, render_output, sanitize_filename, Sample,
};
use a11y_compressor::cli::config::{load_config, parse_ids, resolve_samples, AppConfig, Cli, Mode};
use a11y_compressor::cli::error::CompressError;
use a11y_compressor::domain::domain_model::Domain;
use a11y_compressor::engine::compressor::Compressor;
use clap::Parser;

mod common;

use common::{dump, frame, row};

// ============================================================================
// CLI Argument Parsing Tests
// ============================================================================

#[test]
fn cli_parse_domain_only() {
    let cli = Cli::parse_from(["a11y-compressor", "chrome"]);
    assert_eq!(cli.domain, "chrome");
    assert!(cli.ids.is_none());
    assert!(cli.mode.is_none());
    assert_eq!(cli.verbose, 0);
}

#[test]
fn cli_parse_all_args() {
    let cli = Cli::parse_from([
        "a11y-compressor",
        "thunderbird",
        "1,2,3",
        "instruction",
        "-vv",
        "--config",
        "custom.yaml",
        "--samples-dir",
        "samples",
        "--output-dir",
        "out",
        "--trace",
        "trace.jsonl",
    ]);
    assert_eq!(cli.domain, "thunderbird");
    assert_eq!(cli.ids.as_deref(), Some("1,2,3"));
    assert_eq!(cli.mode.as_deref(), Some("instruction"));
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, Some("custom.yaml".to_string()));
    assert_eq!(cli.samples_dir, Some("samples".to_string()));
    assert_eq!(cli.output_dir, Some("out".to_string()));
    assert_eq!(cli.trace, Some("trace.jsonl".to_string()));
}

// ============================================================================
// Sample / Mode Resolution Tests
// ============================================================================

#[test]
fn resolve_defaults_to_first_sample_baseline() {
    assert_eq!(resolve_samples(None, None), (vec![1], Mode::Baseline));
}

#[test]
fn resolve_id_lists() {
    assert_eq!(resolve_samples(Some("7"), None), (vec![7], Mode::Baseline));
    assert_eq!(
        resolve_samples(Some("1, 2,3"), Some("instruction")),
        (vec![1, 2, 3], Mode::Instruction)
    );
}

#[test]
fn resolve_mode_in_first_position() {
    assert_eq!(
        resolve_samples(Some("instruction"), None),
        (vec![1], Mode::Instruction)
    );
}

#[test]
fn resolve_bad_ids_and_modes_fall_back() {
    assert_eq!(resolve_samples(Some("1,x"), None), (vec![1], Mode::Baseline));
    assert_eq!(
        resolve_samples(Some("4"), Some("verbose")),
        (vec![4], Mode::Baseline)
    );
    assert_eq!(Mode::parse_lenient(" Instruction "), Mode::Instruction);
}

#[test]
fn parse_ids_errors() {
    assert!(matches!(parse_ids("a"), Err(CompressError::Config(_))));
    assert!(matches!(parse_ids(" , "), Err(CompressError::Config(_))));
    assert_eq!(parse_ids("3,1").unwrap(), vec![3, 1]);
}

// ============================================================================
// Config File Tests
// ============================================================================

#[test]
fn config_load_missing_file() {
    let config = load_config(Some("nonexistent_file_that_does_not_exist.yaml"));
    assert_eq!(config.samples.root, "demo_samples");
    assert_eq!(config.samples.output_dir, "demo_outputs");
    assert_eq!(config.engine.view_cooldown, 2);
    assert!(config.trace.path.is_none());
}

#[test]
fn config_default_values() {
    let config = AppConfig::default();
    assert_eq!(config.engine.label_max_len, 140);
    assert!(config.engine.track_terminals);
    assert_eq!(config.samples.root, "demo_samples");
}

#[test]
fn config_partial_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a11y-compressor.yaml");
    std::fs::write(
        &path,
        r#"
engine:
  view_cooldown: 5
samples:
  root: "/data/samples"
trace:
  path: "trace.jsonl"
"#,
    )
    .unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.engine.view_cooldown, 5);
    // Other engine fields get defaults
    assert_eq!(config.engine.label_max_len, 140);
    assert_eq!(config.samples.root, "/data/samples");
    assert_eq!(config.samples.output_dir, "demo_outputs");
    assert_eq!(config.trace.path.as_deref(), Some("trace.jsonl"));
}

#[test]
fn config_malformed_yaml_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    std::fs::write(&path, "engine: [not, a, map").unwrap();

    let config = load_config(path.to_str());
    assert_eq!(config.engine.view_cooldown, 2);
}

#[test]
fn config_yaml_roundtrip() {
    let config = AppConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed.engine.view_cooldown, config.engine.view_cooldown);
    assert_eq!(parsed.samples.root, config.samples.root);
}

// ============================================================================
// Sample I/O Tests
// ============================================================================

fn write_sample(root: &Path, domain: &str, id: u32, a11y: &str, instruction: Option<&str>) {
    let dir = root.join(domain).join(id.to_string());
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("a11y.txt"), a11y).unwrap();
    if let Some(text) = instruction {
        std::fs::write(dir.join("instruction.txt"), text).unwrap();
    }
}

#[test]
fn load_sample_reads_optional_instruction() {
    let root = tempfile::tempdir().unwrap();
    write_sample(root.path(), "gimp", 1, "raw", Some("  Crop the image \n"));
    write_sample(root.path(), "gimp", 2, "raw", Some("   "));
    write_sample(root.path(), "gimp", 3, "raw", None);

    let one = load_sample(root.path(), "gimp", 1).unwrap();
    assert_eq!(one.instruction.as_deref(), Some("Crop the image"));
    assert_eq!(one.a11y, "raw");
    assert!(load_sample(root.path(), "gimp", 2).unwrap().instruction.is_none());
    assert!(load_sample(root.path(), "gimp", 3).unwrap().instruction.is_none());
}

#[test]
fn load_sample_missing_dump() {
    let root = tempfile::tempdir().unwrap();
    let err = load_sample(root.path(), "chrome", 9).unwrap_err();
    match err {
        CompressError::SampleNotFound { domain, id, path } => {
            assert_eq!(domain, "chrome");
            assert_eq!(id, "9");
            assert!(path.ends_with("chrome/9/a11y.txt"));
        }
        other => panic!("Expected SampleNotFound, got {}", other),
    }
}

#[test]
fn output_file_naming() {
    assert_eq!(
        output_filename("chrome", 3, Domain::Chrome, Mode::Instruction),
        "chrome_3_chrome_instruction.txt"
    );
    assert_eq!(
        output_filename("My App", 1, Domain::Generic, Mode::Baseline),
        "my_app_1_generic_baseline.txt"
    );
}

#[test]
fn output_body_layout() {
    let sample = Sample {
        domain: "os".to_string(),
        id: 2,
        a11y: "x".repeat(600),
        instruction: Some("Open a terminal".to_string()),
    };
    let body = render_output(&sample, sample.instruction.as_deref(), Domain::Os, Mode::Instruction, "CONTENT:\n[label] \"a\" @ (1, 1)\n");

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines[1], "SAMPLE: domain=os, id=2 (os-2), mode=instruction");
    assert_eq!(lines[4], "ORIGINAL LINEAR A11Y (Head 500 chars):");
    assert_eq!(lines[5], format!("{}...", "x".repeat(500)));
    assert!(body.contains("INSTRUCTION:\nOpen a terminal\n"));
    assert!(body.contains("DETECTED DOMAIN: os\n"));
    assert!(body.ends_with("=== COMPRESSED A11Y ===\nCONTENT:\n[label] \"a\" @ (1, 1)\n"));

    let baseline = render_output(&sample, None, Domain::Os, Mode::Baseline, "");
    assert!(!baseline.contains("INSTRUCTION:"));
}

#[test]
fn sanitize_filename_special_chars() {
    assert_eq!(sanitize_filename("libreoffice_calc"), "libreoffice_calc");
    assert_eq!(sanitize_filename("Form test (email)"), "form_test__email_");
    assert_eq!(sanitize_filename("simple-name"), "simple-name");
}

// ============================================================================
// compress command
// ============================================================================

#[test]
fn cmd_compress_writes_one_file_per_sample() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("nested");

    let page = dump(&[
        frame(),
        row("push-button", "Reload", 100, 70, 30, 30),
        "entry\tAddress and search bar\thttps://www.google.com/search?q=rust\t\t\t(200, 70)\t(900, 30)"
            .to_string(),
        row("link", "The Rust Programming Language", 200, 300, 400, 20),
    ]);
    write_sample(root.path(), "chrome", 1, &page, Some("Open the Rust book"));
    write_sample(root.path(), "chrome", 2, &page, None);

    let mut compressor = Compressor::default();
    let written = cmd_compress(
        "chrome",
        &[1, 2],
        Mode::Instruction,
        root.path(),
        &out_dir,
        &mut compressor,
        0,
    )
    .unwrap();

    assert_eq!(written.len(), 2);
    assert!(written[0].ends_with("chrome_1_chrome_instruction.txt"));

    let first = std::fs::read_to_string(&written[0]).unwrap();
    assert!(first.contains("INSTRUCTION:\nOpen the Rust book"));
    assert!(first.contains("URL: Google Search: \"rust\""));
    assert!(first.contains("BROWSER_UI:"));

    let second = std::fs::read_to_string(&written[1]).unwrap();
    assert!(!second.contains("INSTRUCTION:"), "Missing instruction runs as baseline");
}

#[test]
fn cmd_compress_skips_a_missing_sample() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let page = dump(&[frame(), row("label", "Layers", 1600, 300, 100, 20)]);
    write_sample(root.path(), "gimp", 1, &page, None);
    write_sample(root.path(), "gimp", 3, &page, None);

    let mut compressor = Compressor::default();
    let written = cmd_compress(
        "gimp",
        &[1, 2, 3],
        Mode::Baseline,
        root.path(),
        out.path(),
        &mut compressor,
        0,
    )
    .unwrap();

    assert_eq!(written.len(), 2, "Ids after the missing one still run");
    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names[0].starts_with("gimp_1_"));
    assert!(names[1].starts_with("gimp_3_"));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 2);
}

#[test]
fn cmd_compress_fails_when_no_sample_loads() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let mut compressor = Compressor::default();

    let result = cmd_compress(
        "gimp",
        &[1, 2],
        Mode::Baseline,
        root.path(),
        out.path(),
        &mut compressor,
        0,
    );
    let err = result.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[test]
fn cmd_compress_unknown_domain_uses_generic_plugin() {
    let root = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sample(root.path(), "notes", 1, &dump(&[row("label", "Hello", 10, 10, 50, 20)]), None);

    let mut compressor = Compressor::default();
    let written = cmd_compress(
        "notes",
        &[1],
        Mode::Baseline,
        root.path(),
        out.path(),
        &mut compressor,
        1,
    )
    .unwrap();

    let body = std::fs::read_to_string(&written[0]).unwrap();
    assert!(body.contains("CONTENT:\n[label] \"Hello\" @ (35, 20)"));
    assert!(written[0].ends_with("notes_1_generic_baseline.txt"));
}
