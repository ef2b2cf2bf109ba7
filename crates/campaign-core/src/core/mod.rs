// crates/campaign-core/src/core/mod.rs
// ============================================================================
// Module: Campaign Core Types
// Description: Identifiers, document model, compiled graph, and configuration.
// Purpose: Provide the canonical campaign types shared by validation and runtime.
// Dependencies: serde, survey-condition, time
// ============================================================================

//! ## Overview
//! Core types split into two layers: the authored [`document`] model that
//! validation reads, and the compiled survey graph and [`Configuration`]
//! that runtime validation reads. Nothing here performs validation.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod configuration;
pub mod document;
pub mod hashing;
pub mod identifiers;
pub mod prompt_type;
pub mod rules;
pub mod survey;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use configuration::CampaignIdentity;
pub use configuration::CampaignState;
pub use configuration::Configuration;
pub use configuration::ConfigurationHandle;
pub use configuration::PrivacyState;
pub use configuration::RunningState;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::CampaignUrn;
pub use identifiers::InvalidUrn;
pub use identifiers::ItemId;
pub use identifiers::SurveyId;
pub use identifiers::is_valid_urn;
pub use prompt_type::DisplayType;
pub use prompt_type::NoResponse;
pub use prompt_type::PromptType;
pub use rules::ChoiceOption;
pub use rules::ChoiceSet;
pub use rules::IntegerRange;
pub use rules::LengthRange;
pub use rules::RemoteActivitySettings;
pub use rules::ResponseRule;
pub use survey::Message;
pub use survey::Prompt;
pub use survey::PromptLocation;
pub use survey::PromptProperty;
pub use survey::RepeatableSet;
pub use survey::SetItem;
pub use survey::Survey;
pub use survey::SurveyItem;
pub use survey::SurveyText;
