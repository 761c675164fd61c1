//! CLI subcommand implementations for the lessongrab binary.

pub mod doctor;
pub mod scrape_cmd;
