use crate::{
    engine::{compressor::Compressor, engine_model::Compression},
    instruction::keywords::instruction_keywords,
};

pub mod cli;
pub mod domain;
pub mod engine;
pub mod geometry;
pub mod instruction;
pub mod plugins;
pub mod trace;
pub mod tree;

/// One-shot compression with a fresh session. With an instruction, long
/// labels are truncated around its keywords.
pub fn compress_from_raw(raw_text: &str, instruction: Option<&str>) -> Compression {
    let keywords = instruction.map(instruction_keywords).unwrap_or_default();
    Compressor::default().compress_raw(raw_text, &keywords)
}
