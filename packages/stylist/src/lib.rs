#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Stylist: lazily provisioned formatter steps.
//!
//! This crate ties the formatter step packages together behind a
//! `stylist.toml` configuration and the `stylist` command line tool.

pub mod config;
pub mod files;

pub use stylist_env as env;
pub use stylist_ktfmt as ktfmt;
pub use stylist_npm as npm;
pub use stylist_step as step;

pub use config::{Config, ConfigError, KtfmtConfig, NpmConfig};
