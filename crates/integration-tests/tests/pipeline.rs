//! Claude client and ingestion pipeline against a mocked Messages API.

use serde_json::json;
use wiremock::MockServer;

use launchkit_core::ingest::prompt::{
    BUNDLE_TEMPLATE, PRODUCT_TEMPLATE, bundle_prompt, product_prompt,
};
use launchkit_core::{
    BundleProposal, FailureCategory, PipelineError, ProductSuggestion, bundle_price, ingest,
    parse_price,
};
use launchkit_integration_tests::{
    claude_client, messages_body, mock_messages, product, suggestion_doc,
};

#[tokio::test]
async fn test_fenced_suggestion_round_trip() {
    let server = MockServer::start().await;
    let text = format!(
        "Here is the optimized listing:\n```json\n{}\n```",
        serde_json::to_string_pretty(&suggestion_doc()).expect("serialize")
    );
    mock_messages(&server, messages_body(&text, "end_turn")).await;

    let mug = product(1, "Mug", "19.99");
    let reply = claude_client(&server)
        .complete(product_prompt(&mug), PRODUCT_TEMPLATE.max_tokens)
        .await
        .expect("reply");
    let suggestion: ProductSuggestion = ingest(&reply).expect("valid suggestion");

    assert_eq!(suggestion.tags(), "mug, ceramic, handmade");
    assert_eq!(suggestion.discount_percent(), 15);
}

#[tokio::test]
async fn test_max_tokens_reply_is_incomplete() {
    let server = MockServer::start().await;
    mock_messages(
        &server,
        messages_body(&suggestion_doc().to_string(), "max_tokens"),
    )
    .await;

    let reply = claude_client(&server)
        .complete("prompt".to_string(), 10)
        .await
        .expect("reply");
    let err = ingest::<ProductSuggestion>(&reply).expect_err("truncated");

    assert_eq!(err, PipelineError::TruncatedResponse);
    assert_eq!(err.category(), FailureCategory::Incomplete);
}

#[tokio::test]
async fn test_reply_without_text_block_is_empty() {
    let server = MockServer::start().await;
    mock_messages(
        &server,
        json!({
            "model": "claude-test",
            "stop_reason": "end_turn",
            "content": [],
        }),
    )
    .await;

    let reply = claude_client(&server)
        .complete("prompt".to_string(), 10)
        .await
        .expect("reply");
    assert_eq!(
        ingest::<ProductSuggestion>(&reply),
        Err(PipelineError::EmptyResponse)
    );
}

#[tokio::test]
async fn test_malformed_reply_reports_context() {
    let server = MockServer::start().await;
    mock_messages(
        &server,
        messages_body(r#"{"title": "Mug", "tags": ["a",]}"#, "end_turn"),
    )
    .await;

    let reply = claude_client(&server)
        .complete("prompt".to_string(), 10)
        .await
        .expect("reply");
    match ingest::<ProductSuggestion>(&reply).expect_err("malformed") {
        PipelineError::MalformedJson {
            offset, context, ..
        } => {
            assert!(offset.is_some());
            assert!(context.contains("\"tags\""));
        }
        other => panic!("expected MalformedJson, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bundle_proposal_and_price() {
    let server = MockServer::start().await;
    let doc = json!({
        "title": "Mug & Coaster Set",
        "description_html": "<p>Both, together.</p>",
        "tags": "bundle, gift",
        "bundle_price_percent_off": 10,
        "bundle_notes": "Ship together"
    });
    mock_messages(&server, messages_body(&doc.to_string(), "end_turn")).await;

    let a = product(1, "Mug", "19.99");
    let b = product(2, "Coaster", "10.01");
    let reply = claude_client(&server)
        .complete(bundle_prompt(&a, &b), BUNDLE_TEMPLATE.max_tokens)
        .await
        .expect("reply");
    let bundle: BundleProposal = ingest(&reply).expect("valid bundle");

    let price = bundle_price(
        parse_price("19.99").expect("price a"),
        parse_price("10.01").expect("price b"),
        bundle.bundle_price_percent_off(),
    )
    .expect("bundle price");
    assert_eq!(price.to_string(), "27.00");
}
