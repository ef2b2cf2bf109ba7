// crates/campaign-cli/src/lib.rs
// ============================================================================
// Module: Campaign CLI Library
// Description: Shared helpers for the `campaign` binary.
// Purpose: Expose the message catalog and event sinks to the binary and tests.
// Dependencies: campaign-config, campaign-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Support code for the `campaign` command-line tool: the message catalog
//! behind the [`t!`] macro and the JSON-line validation event sinks.

pub mod audit;
pub mod i18n;
