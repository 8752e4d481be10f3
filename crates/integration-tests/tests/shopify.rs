//! Admin REST flows against a mocked shop.

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use launchkit_core::{BundleProposal, ProductSuggestion, ShopDomain, bundle_price, revalidate};
use launchkit_integration_tests::{SHOP, TOKEN, product, shopify_client, suggestion_doc};
use launchkit_server::shopify::{
    NewImage, NewMetafield, NewPriceRule, NewProduct, ProductUpdate, ShopifyError,
};

fn shop() -> ShopDomain {
    ShopDomain::parse(SHOP).expect("shop")
}

#[tokio::test]
async fn test_apply_suggestion_flow() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/admin/api/2024-10/products/42.json"))
        .and(header("X-Shopify-Access-Token", TOKEN))
        .and(body_partial_json(json!({"product": {
            "id": 42,
            "title": "Hand-thrown Ceramic Mug",
            "tags": "mug, ceramic, handmade"
        }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"product": {"id": 42}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-10/price_rules.json"))
        .and(body_partial_json(json!({"price_rule": {
            "title": "Launch Discount: LAUNCH15",
            "value": "-15",
            "value_type": "percentage"
        }})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"price_rule": {"id": 900}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-10/price_rules/900/discount_codes.json"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "discount_code": {"id": 1, "code": "LAUNCH15", "price_rule_id": 900}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = shopify_client(&server);
    let suggestion: ProductSuggestion = revalidate(suggestion_doc()).expect("valid");

    client
        .update_product(&shop(), TOKEN, &ProductUpdate::from_suggestion(42, &suggestion))
        .await
        .expect("update");
    let rule = client
        .create_price_rule(
            &shop(),
            TOKEN,
            &NewPriceRule::launch(
                suggestion.discount_code(),
                suggestion.discount_percent(),
                Utc::now(),
            ),
        )
        .await
        .expect("price rule");
    let code = client
        .create_discount_code(&shop(), TOKEN, rule.id, suggestion.discount_code())
        .await
        .expect("discount code");
    assert_eq!(code.code, "LAUNCH15");
}

#[tokio::test]
async fn test_create_bundle_product_with_metafield() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-10/products.json"))
        .and(body_partial_json(json!({"product": {
            "product_type": "Bundle",
            "variants": [{"title": "Bundle Default", "price": "27.00"}],
            "images": [
                {"src": "https://cdn.shopify.com/1.jpg"},
                {"src": "https://cdn.shopify.com/2.jpg"}
            ]
        }})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"product": {"id": 77}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/api/2024-10/metafields.json"))
        .and(body_partial_json(json!({"metafield": {
            "namespace": "bundle",
            "key": "components",
            "owner_id": 77
        }})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"metafield": {"id": 5}})))
        .expect(1)
        .mount(&server)
        .await;

    let a = product(1, "Mug", "19.99");
    let b = product(2, "Coaster", "10.01");
    let proposal: BundleProposal = revalidate(json!({
        "title": "Mug & Coaster Set",
        "description_html": "<p>Both.</p>",
        "tags": ["bundle"],
        "bundle_price_percent_off": 10,
        "bundle_notes": ""
    }))
    .expect("valid");
    let price = bundle_price(
        "19.99".parse().expect("decimal"),
        "10.01".parse().expect("decimal"),
        proposal.bundle_price_percent_off(),
    )
    .expect("price");
    let images = [&a, &b]
        .into_iter()
        .filter_map(launchkit_server::shopify::first_image_src)
        .map(|src| NewImage {
            src: src.to_string(),
        })
        .collect();

    let client = shopify_client(&server);
    let created = client
        .create_product(&shop(), TOKEN, &NewProduct::bundle(&proposal, price, images))
        .await
        .expect("created");
    let bundle_id = created["id"].as_u64().expect("id");
    client
        .create_metafield(
            &shop(),
            TOKEN,
            &NewMetafield::bundle_components(bundle_id, 1, 2, proposal.bundle_notes()),
        )
        .await
        .expect("metafield");
}

#[tokio::test]
async fn test_announcement_written_to_main_theme() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-10/themes.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"themes": [
            {"id": 3, "name": "Dawn", "role": "main"}
        ]})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/admin/api/2024-10/themes/3/assets.json"))
        .and(body_partial_json(json!({"asset": {"key": "snippets/launch-bar.liquid"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "asset": {"key": "snippets/launch-bar.liquid", "theme_id": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = shopify_client(&server);
    let theme = client.main_theme(&shop(), TOKEN).await.expect("theme");
    let asset = client
        .put_asset(&shop(), TOKEN, theme.id, "snippets/launch-bar.liquid", "<div></div>")
        .await
        .expect("asset");
    assert_eq!(asset.theme_id, Some(3));
}

#[tokio::test]
async fn test_protected_data_approval_surfaces() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-10/products.json"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            r#"{"errors":"This app is not approved to access REST endpoints with protected customer data. Merchant approval required."}"#,
        ))
        .mount(&server)
        .await;

    let err = shopify_client(&server)
        .list_products(&shop(), TOKEN, 50)
        .await
        .expect_err("forbidden");
    assert!(matches!(err, ShopifyError::ScopeApprovalRequired), "got {err:?}");
}

#[tokio::test]
async fn test_product_fixture_round_trips_through_client() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/api/2024-10/products/1.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"product": product(1, "Mug", "19.99")})),
        )
        .mount(&server)
        .await;

    let fetched = shopify_client(&server)
        .get_product(&shop(), TOKEN, 1)
        .await
        .expect("product");
    assert_eq!(
        launchkit_server::shopify::first_variant_price(&fetched),
        Some("19.99")
    );
}
