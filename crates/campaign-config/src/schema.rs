// crates/campaign-config/src/schema.rs
// ============================================================================
// Module: Campaign Document Schema
// Description: JSON Schema builder for authored campaign documents.
// Purpose: Provide the canonical shape check run before semantic validation.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! This module defines the JSON Schema (Draft 2020-12) for campaign
//! documents. The schema covers shape only: field presence, JSON types, and
//! which item kinds may appear where. Prompt types, display types, and
//! property bundles are left as strings for the semantic passes to judge.
//!
//! Security posture: schemas gate untrusted inputs.

use serde_json::Value;
use serde_json::json;

/// Returns the JSON schema for campaign documents.
#[must_use]
pub fn campaign_document_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "campaign-validator://schemas/campaign-document.schema.json",
        "title": "Campaign Document",
        "description": "An authored campaign: its identity and the surveys participants answer.",
        "type": "object",
        "required": ["campaignUrn", "campaignName", "surveys"],
        "properties": {
            "campaignUrn": non_empty_string("Campaign URN, for example urn:campaign:study:one."),
            "campaignName": non_empty_string("Human-readable campaign name."),
            "description": { "type": "string" },
            "serverUrl": { "type": "string" },
            "iconUrl": { "type": "string" },
            "surveys": {
                "type": "array",
                "minItems": 1,
                "items": survey_schema()
            }
        },
        "additionalProperties": false
    })
}

/// Schema for one survey.
fn survey_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "title", "submitText", "showSummary", "anytime", "contentList"],
        "properties": {
            "id": identifier_schema(),
            "title": non_empty_string("Survey title."),
            "description": { "type": "string" },
            "introText": { "type": "string" },
            "submitText": { "type": "string" },
            "showSummary": { "type": "boolean" },
            "editSummary": { "type": "boolean" },
            "summaryText": { "type": "string" },
            "anytime": { "type": "boolean" },
            "contentList": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "oneOf": [
                        wrapped("message", message_schema()),
                        wrapped("prompt", prompt_schema()),
                        wrapped("repeatableSet", repeatable_set_schema())
                    ]
                }
            }
        },
        "additionalProperties": false
    })
}

/// Schema for a repeatable set; its items exclude nested sets.
fn repeatable_set_schema() -> Value {
    json!({
        "type": "object",
        "required": [
            "id",
            "terminationQuestion",
            "terminationTrueLabel",
            "terminationFalseLabel",
            "terminationSkipEnabled",
            "prompts"
        ],
        "properties": {
            "id": identifier_schema(),
            "condition": { "type": "string" },
            "terminationQuestion": { "type": "string" },
            "terminationTrueLabel": { "type": "string" },
            "terminationFalseLabel": { "type": "string" },
            "terminationSkipEnabled": { "type": "boolean" },
            "terminationSkipLabel": { "type": "string" },
            "prompts": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "oneOf": [
                        wrapped("message", message_schema()),
                        wrapped("prompt", prompt_schema())
                    ]
                }
            }
        },
        "additionalProperties": false
    })
}

/// Schema for a message.
fn message_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "messageText"],
        "properties": {
            "id": identifier_schema(),
            "condition": { "type": "string" },
            "messageText": { "type": "string" }
        },
        "additionalProperties": false
    })
}

/// Schema for a prompt.
fn prompt_schema() -> Value {
    json!({
        "type": "object",
        "required": ["id", "promptText", "promptType", "displayType", "skippable"],
        "properties": {
            "id": identifier_schema(),
            "condition": { "type": "string" },
            "unit": { "type": "string" },
            "promptText": { "type": "string" },
            "abbreviatedText": { "type": "string" },
            "explanationText": { "type": "string" },
            "promptType": non_empty_string("Prompt type tag, for example number."),
            "displayType": non_empty_string("Display type tag, for example measurement."),
            "displayLabel": { "type": "string" },
            "skippable": { "type": "boolean" },
            "skipLabel": { "type": "string" },
            "default": { "type": "string" },
            "properties": {
                "type": "array",
                "items": property_schema()
            }
        },
        "additionalProperties": false
    })
}

/// Schema for one prompt property.
fn property_schema() -> Value {
    json!({
        "type": "object",
        "required": ["key", "label"],
        "properties": {
            "key": { "type": "string" },
            "label": { "type": "string" },
            "value": { "type": "string" }
        },
        "additionalProperties": false
    })
}

/// Wraps an item schema in its single-key tag object.
fn wrapped(tag: &str, schema: Value) -> Value {
    json!({
        "type": "object",
        "required": [tag],
        "properties": { tag: schema },
        "additionalProperties": false
    })
}

/// Schema for survey and item identifiers.
fn identifier_schema() -> Value {
    json!({
        "type": "string",
        "pattern": "^[A-Za-z_][A-Za-z0-9_]*$",
        "description": "Identifier usable in display conditions."
    })
}

/// Schema for a non-empty string with a description.
fn non_empty_string(description: &str) -> Value {
    json!({
        "type": "string",
        "minLength": 1,
        "description": description
    })
}
