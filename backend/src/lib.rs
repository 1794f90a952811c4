//! # DAB Rust Backend
//!
//! Data-wrangling and analysis engine for UK DAB transmitter extracts.
//!
//! This crate cleans the antenna and transmitter-parameter CSV extracts of the
//! national DAB register, joins them, isolates the three tracked multiplexes
//! (C18A, C18F, C188), stores the result as nested JSON documents and derives
//! chart models from the stored records.
//!
//! ## Features
//!
//! - **Decoding**: UTF-8 with a Latin-1 fallback for legacy extracts
//! - **Preprocessing**: join, deduplicate, normalise and filter the extracts
//! - **Persistence**: full-replace document store (in-memory, JSON file or PostgreSQL)
//! - **Analysis**: conditional power statistics, grouped service counts and Cramér's V
//! - **HTTP API**: REST endpoints via Axum
//! - **CLI**: `dab-cli` for batch use
//!
//! ## Architecture
//!
//! - [`parsing`]: byte decoding and the antenna/params join
//! - [`transformations`]: cleaning, multiplex extraction and projection
//! - [`preprocessing`]: the end-to-end pipeline and input checks
//! - [`db`]: document serialization, schema validation and repositories
//! - [`services`]: statistics, aggregation, correlation and ingest
//! - [`routes`]: result types for each visualisation
//! - [`api`]: DTO re-exports
//! - [`http`]: Axum server and handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod error;

pub mod db;
pub mod models;
pub mod parsing;
pub mod preprocessing;
pub mod transformations;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
