// crates/campaign-config/src/lib.rs
// ============================================================================
// Module: Campaign Config Library
// Description: Validator configuration model and campaign document schema.
// Purpose: Single source of truth for campaign-validator.toml semantics.
// Dependencies: serde, serde_json, toml
// ============================================================================

//! ## Overview
//! `campaign-config` defines the configuration of the campaign validator
//! (document and response limits, schema source, event sink) with strict,
//! fail-closed validation. It also generates the canonical JSON Schema that
//! campaign documents are checked against before any semantic pass runs.
//!
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use schema::campaign_document_schema;
