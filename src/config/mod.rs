//! Configuration module for Site-Porter
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use site_porter::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("porter.toml")).unwrap();
//! println!("Crawl budget: {} pages", config.crawl.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_document_extensions, Config, CrawlConfig, OutputConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validation entry points used by the crawler
pub use validation::{validate, validate_crawl_config};
