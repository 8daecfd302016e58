pub mod domain_model;
pub mod scorer;
