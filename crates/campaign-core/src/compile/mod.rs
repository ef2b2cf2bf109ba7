// crates/campaign-core/src/compile/mod.rs
// ============================================================================
// Module: Campaign Compilation
// Description: Validation followed by schema building in one call.
// Purpose: Turn campaign document text into a Configuration or an error.
// Dependencies: crate::{core, validation}
// ============================================================================

//! ## Overview
//! [`compile_campaign`] is the usual entry point: it runs the structural
//! validator and hands the validated campaign to the [`SchemaBuilder`]. A
//! configuration is only ever built from a document that passed every pass.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod schema_builder;

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::CampaignState;
use crate::core::Configuration;
use crate::validation::StructuralError;
use crate::validation::StructuralValidator;
use crate::validation::ValidationWarning;

pub use schema_builder::ConfigurationError;
pub use schema_builder::SchemaBuilder;

// ============================================================================
// SECTION: Compilation
// ============================================================================

/// Errors raised by [`compile_campaign`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The document failed a validation pass.
    #[error(transparent)]
    Structural(#[from] StructuralError),
    /// The validated document could not be built.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// A compiled configuration with the warnings raised on the way.
#[derive(Debug, Clone)]
pub struct Compilation {
    /// The compiled configuration.
    pub configuration: Configuration,
    /// Non-fatal authoring findings.
    pub warnings: Vec<ValidationWarning>,
}

/// Validates and compiles a campaign document.
///
/// # Errors
///
/// Returns [`CompileError::Structural`] when validation fails and
/// [`CompileError::Configuration`] when building fails.
pub fn compile_campaign(
    validator: &StructuralValidator,
    text: &str,
    state: CampaignState,
) -> Result<Compilation, CompileError> {
    let validated = validator.validate(text)?;
    let warnings = validated.warnings().to_vec();
    let configuration = SchemaBuilder::build(validated, state)?;
    Ok(Compilation {
        configuration,
        warnings,
    })
}
