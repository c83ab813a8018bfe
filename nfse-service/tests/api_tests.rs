mod common;

use common::TestApp;
use common::PASSWORD;
use reqwest::header;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

fn acme() -> Value {
    json!({
        "name": "Abacus Contabilidade",
        "cnpj": "12.345.678/0001-99",
        "phone": "(11) 3333-4444",
        "email": "fiscal@abacus.com.br"
    })
}

async fn create_issuer(app: &TestApp, token: &str, body: &Value) -> reqwest::Response {
    app.post_authenticated("/issuers", token)
        .json(body)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn test_register_user_success() {
    let app = TestApp::spawn().await;

    let body = app.register("maria@example.com", "(11) 98765-4321").await;

    assert_eq!(body["name"], "Maria Silva");
    assert_eq!(body["email"], "maria@example.com");
    assert_eq!(body["phone"], "+5511987654321");
    assert_eq!(body["active"], true);
    assert!(body["id"].is_i64());
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_user_duplicate_email() {
    let app = TestApp::spawn().await;
    app.register("maria@example.com", "+5511987654321").await;

    let response = app
        .post("/users")
        .json(&json!({
            "name": "Outra Maria",
            "email": "maria@example.com",
            "phone": "+5521987654321",
            "password": PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_user_invalid_phone() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/users")
        .json(&json!({
            "name": "Maria Silva",
            "email": "maria@example.com",
            "phone": "12",
            "password": PASSWORD,
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::spawn().await;
    app.register("maria@example.com", "+5511987654321").await;

    let response = app.login("maria@example.com", PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_type"], "Bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register("maria@example.com", "+5511987654321").await;

    let wrong_password = app.login("maria@example.com", "wrong_password").await;
    let unknown_user = app.login("nobody@example.com", PASSWORD).await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong_password.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_user: Value = unknown_user.json().await.unwrap();
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = TestApp::spawn().await;

    let missing = app.get("/issuers").send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        missing.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let garbage = app
        .get_authenticated("/issuers", "not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    let response = app
        .post_authenticated("/auth/refresh_token", &token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let refreshed = body["access_token"].as_str().unwrap();

    let response = app.get_authenticated("/users", refreshed).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_inactive_subject_rejected_when_enabled() {
    let app = TestApp::spawn_with(true).await;
    let token = app.signed_in().await;

    let response = app
        .patch_authenticated("/users/1/deactivate", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get_authenticated("/users", &token).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.login("maria@example.com", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_issuer_and_conflict() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    let response = create_issuer(&app, &token, &acme()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["cnpj"], "12.345.678/0001-99");
    assert_eq!(body["phone"], "+551133334444");
    assert_eq!(body["active"], true);

    let mut duplicate = acme();
    duplicate["name"] = json!("Outra Empresa");
    let response = create_issuer(&app, &token, &duplicate).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_issuer_rejects_cpf() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    let mut body = acme();
    body["cnpj"] = json!("123.456.789-09");

    let response = create_issuer(&app, &token, &body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_activation_transitions() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;
    create_issuer(&app, &token, &acme()).await;

    let response = app
        .patch_authenticated("/issuers/1/activate", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "issuer already activated");

    let response = app
        .patch_authenticated("/issuers/1/deactivate", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["active"], false);

    let response = app
        .patch_authenticated("/issuers/1/deactivate", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .patch_authenticated("/issuers/1/activate", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_search_by_name_and_document() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;
    create_issuer(&app, &token, &acme()).await;
    create_issuer(
        &app,
        &token,
        &json!({
            "name": "Globex Servicos",
            "cnpj": "98.765.432/0001-10",
            "phone": "(21) 3333-4444",
            "email": "nf@globex.com.br"
        }),
    )
    .await;

    let by_name: Value = app
        .get_authenticated("/issuers/search?q=ab", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = by_name
        .as_array()
        .unwrap()
        .iter()
        .map(|issuer| issuer["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Abacus Contabilidade"]);

    let by_document: Value = app
        .get_authenticated("/issuers/search?q=12345678", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_document.as_array().unwrap().len(), 1);
    assert_eq!(by_document[0]["cnpj"], "12.345.678/0001-99");

    let too_short = app
        .get_authenticated("/issuers/search?q=a", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(too_short.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_partial_update() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;
    create_issuer(&app, &token, &acme()).await;

    let response = app
        .patch_authenticated("/issuers/1", &token)
        .json(&json!({ "name": "Abacus Contabilidade Ltda" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Abacus Contabilidade Ltda");
    assert_eq!(body["cnpj"], "12.345.678/0001-99");
    assert_eq!(body["email"], "fiscal@abacus.com.br");

    let empty = app
        .patch_authenticated("/issuers/1", &token)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let unknown_field = app
        .patch_authenticated("/issuers/1", &token)
        .json(&json!({ "active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_field.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_is_keyed_by_collection() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    app.post_authenticated("/roles", &token)
        .json(&json!({ "name": "admin", "description": "Full access" }))
        .send()
        .await
        .unwrap();

    let body: Value = app
        .get_authenticated("/roles/", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let roles = body["roles"].as_array().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0]["name"], "admin");
    assert_eq!(roles[0]["description"], "Full access");
}

#[tokio::test]
async fn test_recipient_optional_contacts() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    let response = app
        .post_authenticated("/recipients", &token)
        .json(&json!({ "name": "Joao Souza", "document": "123.456.789-09" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["document"], "123.456.789-09");
    assert!(body["phone"].is_null());
    assert!(body["email"].is_null());
}

#[tokio::test]
async fn test_lookup_user() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    let by_email = app
        .get_authenticated("/users/lookup?email=maria@example.com", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(by_email.status(), StatusCode::OK);

    let by_phone: Value = app
        .get_authenticated("/users/lookup?phone=11987654321", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_phone["email"], "maria@example.com");

    let missing = app
        .get_authenticated("/users/lookup?email=nobody@example.com", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let ambiguous = app
        .get_authenticated("/users/lookup", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(ambiguous.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_record() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    let response = app
        .get_authenticated("/recipients/42", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .get_authenticated("/recipients/abc", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_user_password() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    let response = app
        .patch_authenticated("/users/1", &token)
        .json(&json!({ "password": "new_pass_word!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let old = app.login("maria@example.com", PASSWORD).await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = app.login("maria@example.com", "new_pass_word!").await;
    assert_eq!(new.status(), StatusCode::OK);
}

fn invoice() -> Value {
    json!({
        "number": "000123",
        "series": "1",
        "cfop": "5102",
        "issuer_name": "Abacus Contabilidade",
        "issuer_cnpj": "12.345.678/0001-99",
        "recipient_name": "Joao Souza",
        "recipient_document": "123.456.789-09",
        "total": 1500,
        "icms": "270.5"
    })
}

#[tokio::test]
async fn test_register_and_list_invoices() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    let response = app
        .post_authenticated("/invoices/register", &token)
        .json(&invoice())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["number"], "000123");
    assert_eq!(body["total"], "1500.00");
    assert_eq!(body["icms"], "270.50");
    assert!(body["discount"].is_null());

    let response = app
        .post_authenticated("/invoices", &token)
        .json(&invoice())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = app
        .get_authenticated("/invoices/", &token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let invoices = body["invoices"].as_array().unwrap();
    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[1]["id"], 2);

    let response = app
        .get_authenticated("/invoices/2", &token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invoice_validation() {
    let app = TestApp::spawn().await;
    let token = app.signed_in().await;

    let mut zero_total = invoice();
    zero_total["total"] = json!(0);
    let mut negative_tax = invoice();
    negative_tax["discount"] = json!(-5);
    let mut extra_field = invoice();
    extra_field["user_id"] = json!(1);

    for body in [zero_total, negative_tax, extra_field] {
        let response = app
            .post_authenticated("/invoices/register", &token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
    }

    let response = app.post("/invoices/register").json(&invoice()).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let edit = app
        .patch_authenticated("/invoices/1", &token)
        .json(&json!({ "total": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(edit.status(), StatusCode::METHOD_NOT_ALLOWED);
}
