// crates/campaign-core/src/lib.rs
// ============================================================================
// Module: Campaign Core Library
// Description: Public API surface for campaign validation.
// Purpose: Expose campaign types, validation, compilation, and response checks.
// Dependencies: crate::{core, interfaces, validation, compile, runtime}
// ============================================================================

//! ## Overview
//! Campaign core turns an authored campaign document into an immutable
//! [`Configuration`] and validates survey responses against it. Documents
//! pass through the [`StructuralValidator`] and the [`SchemaBuilder`];
//! responses pass through the [`ResponseValidationEngine`]. Outcomes are
//! reported to a caller-supplied [`ValidationEventSink`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod compile;
pub mod core;
pub mod interfaces;
pub mod runtime;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use self::core::*;

pub use compile::Compilation;
pub use compile::CompileError;
pub use compile::ConfigurationError;
pub use compile::SchemaBuilder;
pub use compile::compile_campaign;
pub use interfaces::NoopEventSink;
pub use interfaces::RecordingEventSink;
pub use interfaces::ValidationEvent;
pub use interfaces::ValidationEventSink;
pub use interfaces::ValidationOutcome;
pub use runtime::MediaSet;
pub use runtime::NormalizedResponses;
pub use runtime::ResponseError;
pub use runtime::ResponseValidationEngine;
pub use runtime::SurveyResponseMetadata;
pub use validation::StructuralError;
pub use validation::StructuralValidator;
pub use validation::ValidatedCampaign;
pub use validation::ValidationLimits;
pub use validation::ValidationPass;
pub use validation::ValidationWarning;
