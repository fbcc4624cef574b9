//! Shared test utilities for the OpenTTD server helpers workspace.
//!
//! This crate provides standardised fixtures so every crate's tests build
//! servers and archives the same way. It is a dev-dependency only and is
//! never published.
//!
//! # Modules
//!
//! - [`archive`]: gzip-compressed tar bodies as served by BaNaNaS
//! - [`server`]: [`TestServer`] builder for a server config directory

pub mod archive;
pub mod server;

pub use server::TestServer;
