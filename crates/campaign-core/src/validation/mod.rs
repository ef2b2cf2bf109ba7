// crates/campaign-core/src/validation/mod.rs
// ============================================================================
// Module: Campaign Validation
// Description: Structural validation of authored campaign documents.
// Purpose: Reject inconsistent documents before any configuration is built.
// Dependencies: crate::core, survey-condition, jsonschema
// ============================================================================

//! ## Overview
//! Validation is the only gate into compilation. The structural validator
//! runs ordered passes and delegates per-type checks to the prompt type
//! validators, which it creates fresh for every run.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod error;
pub mod prompt_types;
pub mod structural;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use error::StructuralError;
pub use error::ValidationPass;
pub use prompt_types::PromptTypeValidator;
pub use prompt_types::ValidatorVariant;
pub use prompt_types::is_known_prompt_type;
pub use prompt_types::validator_for;
pub use structural::DEFAULT_MAX_DOCUMENT_BYTES;
pub use structural::SchemaCompileError;
pub use structural::StructuralValidator;
pub use structural::ValidatedCampaign;
pub use structural::ValidationLimits;
pub use structural::ValidationWarning;
