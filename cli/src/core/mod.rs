//! # Modpack Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components that the
//! packaging command builds on:
//! - `config`: Configuration loading, merging, and validation
//! - `error`: Error types and error handling utilities
//! - `metadata`: Reading the mod descriptor (`name`, `version`)
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{ModpackError, Result}; // For error handling
//! use crate::core::metadata; // For the archive name
//! ```
//!
pub mod config;
pub mod error;
pub mod metadata;
