// crates/campaign-core/src/runtime/mod.rs
// ============================================================================
// Module: Response Runtime
// Description: Response validation against compiled configurations.
// Purpose: Check submitted survey responses and normalize their answers.
// Dependencies: crate::{core, interfaces}, survey-condition
// ============================================================================

//! ## Overview
//! The runtime validates survey responses: the metadata envelope first,
//! then every item in document order. Display conditions are evaluated
//! against the answers already accepted in the same response.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod engine;
pub mod metadata;
pub mod values;
pub mod visibility;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::DEFAULT_MAX_RESPONSES;
pub use engine::NormalizedResponses;
pub use engine::ResponseError;
pub use engine::ResponseValidationEngine;
pub use metadata::LaunchContext;
pub use metadata::Location;
pub use metadata::LocationStatus;
pub use metadata::MetadataError;
pub use metadata::ResponsePrivacyState;
pub use metadata::SurveyResponseMetadata;
pub use values::CheckedValue;
pub use values::CustomAnswer;
pub use values::MediaSet;
pub use values::check_value;
pub use visibility::RecordedResponse;
pub use visibility::RecordedResponses;
pub use visibility::compare_response;
