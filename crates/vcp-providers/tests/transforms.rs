// crates/vcp-providers/tests/transforms.rs
// ============================================================================
// Module: Value Transform Tests
// Description: Sentiment, channel, disconnect, and qualification transforms.
// ============================================================================
//! ## Overview
//! Covers documented scenarios, table dispatch, projections, and totality of
//! every transform over arbitrary input.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;
use vcp_core::schema::common::OutcomeStatus;
use vcp_core::schema::v05::ChannelType;
use vcp_providers::Projection;
use vcp_providers::TransformTable;
use vcp_providers::ValueTransform;
use vcp_providers::projections::assistable_digest;
use vcp_providers::projections::derive_integrations;
use vcp_providers::transforms::direction_channel;
use vcp_providers::transforms::disconnect_status;
use vcp_providers::transforms::qualification_score;
use vcp_providers::transforms::sentiment_score;

use crate::common::example_payload;

// ============================================================================
// SECTION: Sentiment
// ============================================================================

/// Tests labels map to their buckets regardless of case and separators.
#[test]
fn test_sentiment_labels() {
    assert!((sentiment_score(&json!("Slightly_Positive")) - 0.6).abs() < f64::EPSILON);
    assert!((sentiment_score(&json!("very-negative")) - 0.0).abs() < f64::EPSILON);
    assert!((sentiment_score(&json!("slightly negative")) - 0.4).abs() < f64::EPSILON);
    assert!((sentiment_score(&json!("POSITIVE")) - 0.8).abs() < f64::EPSILON);
    assert!((sentiment_score(&json!("very_positive")) - 1.0).abs() < f64::EPSILON);
}

/// Tests unknown labels and out-of-range numbers score neutral.
#[test]
fn test_sentiment_defaults_to_neutral() {
    assert!((sentiment_score(&json!("ecstatic")) - 0.5).abs() < f64::EPSILON);
    assert!((sentiment_score(&json!("")) - 0.5).abs() < f64::EPSILON);
    assert!((sentiment_score(&json!(1.7)) - 0.5).abs() < f64::EPSILON);
    assert!((sentiment_score(&json!(0.25)) - 0.25).abs() < f64::EPSILON);
    assert!((sentiment_score(&json!(true)) - 0.5).abs() < f64::EPSILON);
}

// ============================================================================
// SECTION: Channel and Disconnect
// ============================================================================

/// Tests directions collapse to phone and known channels pass through.
#[test]
fn test_direction_channel() {
    assert_eq!(direction_channel(&json!("inbound")), ChannelType::Phone);
    assert_eq!(direction_channel(&json!("outbound")), ChannelType::Phone);
    assert_eq!(direction_channel(&json!("web")), ChannelType::Web);
    assert_eq!(direction_channel(&json!("API")), ChannelType::Api);
    assert_eq!(direction_channel(&json!("websocket")), ChannelType::Websocket);
    assert_eq!(direction_channel(&json!("carrier pigeon")), ChannelType::Phone);
    assert_eq!(direction_channel(&json!(7)), ChannelType::Phone);
}

/// Tests disconnect reasons classify by keyword priority.
#[test]
fn test_disconnect_status_priority() {
    assert_eq!(
        disconnect_status(&json!("customer completed booking after transfer")),
        OutcomeStatus::Success
    );
    assert_eq!(disconnect_status(&json!("line busy, no answer")), OutcomeStatus::Timeout);
    assert_eq!(disconnect_status(&json!("SIP connection dropped")), OutcomeStatus::Error);
    assert_eq!(disconnect_status(&json!("partial transfer")), OutcomeStatus::Partial);
    assert_eq!(disconnect_status(&json!("user_hangup")), OutcomeStatus::Failure);
    assert_eq!(disconnect_status(&json!("finished but failed")), OutcomeStatus::Success);
    assert_eq!(disconnect_status(&Value::Null), OutcomeStatus::Failure);
}

// ============================================================================
// SECTION: Qualification
// ============================================================================

/// Tests each qualification signal adds its points.
#[test]
fn test_qualification_components() {
    assert!((qualification_score(&json!({})) - 0.5).abs() < 1e-9);
    assert!((qualification_score(&json!({"decision_maker": true})) - 0.7).abs() < 1e-9);
    assert!((qualification_score(&json!({"budget_range": "$100"})) - 0.65).abs() < 1e-9);
    assert!((qualification_score(&json!({"purchase_timeline": "next quarter"})) - 0.6).abs() < 1e-9);
    assert!((qualification_score(&json!({"lead": {"purchase_timeline": "urgent"}})) - 0.65).abs() < 1e-9);
    assert!((qualification_score(&json!("not a map")) - 0.5).abs() < 1e-9);
}

/// Tests the catalogue example reaches the score ceiling exactly.
#[test]
fn test_assistable_example_qualifies_fully() {
    let payload = example_payload("assistable");
    assert!((qualification_score(&payload["extractions"]) - 1.0).abs() < f64::EPSILON);
}

// ============================================================================
// SECTION: Projections
// ============================================================================

/// Tests Assistable integrations derive CRM, calendar, and sales signals.
#[test]
fn test_assistable_integrations() {
    let integrations = derive_integrations(&example_payload("assistable"));
    let crm = &integrations["crm_system"];
    assert_eq!(crm["provider"], "assistable_extractions");
    assert_eq!(crm["lead_score"], "high");
    assert_eq!(crm["contact_data"]["contact_zip_code"], "90210");
    assert_eq!(crm["contact_data"]["customer_interest_level"], "high");

    let calendar = &integrations["calendar_system"];
    assert_eq!(calendar["next_action"], "2025-10-21");
    assert_eq!(calendar["scheduling_data"]["next_followup_date"], "2025-10-21");

    let sales = &integrations["sales_system"];
    assert_eq!(sales["provider"], "assistable_sales_intelligence");
    assert!((sales["qualification_score"].as_f64().unwrap() - 1.0).abs() < f64::EPSILON);
    assert_eq!(sales["opportunity_data"]["budget_range"], "$500-1000");
    assert!(sales["opportunity_data"].get("contact_zip_code").is_none());
}

/// Tests payloads without extractions derive nothing.
#[test]
fn test_integrations_empty_without_extractions() {
    assert!(derive_integrations(&json!({"call_id": "x"})).is_empty());
    assert!(derive_integrations(&json!({"extractions": {}})).is_empty());
}

/// Tests the Assistable digest gathers task completion and analytics.
#[test]
fn test_assistable_digest() {
    let digest = assistable_digest(&example_payload("assistable"));
    assert_eq!(digest["call_type"], "outbound_sales");
    assert_eq!(digest["task_completion"]["completion_reason"], "task_completed");
    assert_eq!(digest["analytics"]["user_sentiment_raw"], "positive");
    assert_eq!(digest["call_args"]["contact_address_zip_code"], "90210");

    let sparse = assistable_digest(&json!({}));
    assert_eq!(sparse["task_completion"]["call_completed"], false);
    assert_eq!(sparse["extractions"], json!({}));
}

// ============================================================================
// SECTION: Table
// ============================================================================

/// Tests the built-in table dispatches by provider and canonical path.
#[test]
fn test_builtin_table_dispatch() {
    let table = TransformTable::builtin();
    assert_eq!(
        table.value_transform("assistable", "outcomes.objective.status"),
        Some(ValueTransform::DisconnectStatus)
    );
    assert_eq!(table.value_transform("retell", "outcomes.objective.status"), None);
    assert_eq!(table.value_transform("assistable", "call.call_id"), None);
    assert_eq!(
        table.projections("assistable"),
        vec![
            ("custom.integrations", Projection::SalesIntegrations),
            ("custom.provider_specific.assistable", Projection::AssistableDigest),
        ]
    );
    assert!(table.projections("vapi").is_empty());
}

/// Tests table entries can be replaced per provider.
#[test]
fn test_table_insert_replaces_entry() {
    let mut table = TransformTable::new();
    table.insert_value("vapi", "call.channel", ValueTransform::DirectionChannel);
    table.insert_value("vapi", "call.channel", ValueTransform::SentimentScore);
    assert_eq!(table.value_transform("vapi", "call.channel"), Some(ValueTransform::SentimentScore));
    assert_eq!(ValueTransform::DisconnectStatus.apply(&json!("busy")), json!("timeout"));
    assert_eq!(ValueTransform::DirectionChannel.apply(&json!("inbound")), json!("phone"));
}

// ============================================================================
// SECTION: Totality
// ============================================================================

proptest! {
    /// Tests every transform stays in range for arbitrary text.
    #[test]
    fn test_transforms_total_over_strings(text in ".*") {
        let value = Value::String(text);
        let score = sentiment_score(&value);
        prop_assert!((0.0..=1.0).contains(&score));
        prop_assert!(ChannelType::ALL.contains(&direction_channel(&value)));
        prop_assert!(OutcomeStatus::ALL.contains(&disconnect_status(&value)));
        let qualification = qualification_score(&value);
        prop_assert!((0.5..=1.0).contains(&qualification));
    }

    /// Tests qualification stays in range for arbitrary extraction maps.
    #[test]
    fn test_qualification_total_over_maps(
        decision_maker in any::<bool>(),
        budget in ".*",
        timeline in ".*",
    ) {
        let extractions = json!({
            "decision_maker": decision_maker,
            "budget_range": budget,
            "purchase_timeline": timeline,
        });
        let score = qualification_score(&extractions);
        prop_assert!((0.5..=1.0).contains(&score));
    }
}
