pub mod compressor;
pub mod detectors;
pub mod engine_model;
pub mod modal;
pub mod plugin;
pub mod serialize;
