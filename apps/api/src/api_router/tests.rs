use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode, header};
use contentai_application::{
    ContentGenerator, GenerationPrompt, GenerationService, IdentityProvider, IdentityService,
    PostService, RateLimitRule, RateLimitService, SessionTokenService,
};
use contentai_core::{AppError, AppResult};
use contentai_domain::IdentityClaims;
use contentai_infrastructure::{
    InMemoryPostRepository, InMemoryRateLimitRepository, InMemoryUserRepository,
    JwtSessionTokenCodec,
};
use ipnet::IpNet;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::build_router;
use crate::state::AppState;

const CLIENT_ID: &str = "test-client";
const BOUNDARY: &str = "contentai-test-boundary";
const OBJECTIVE: &str = "Announce the v2 launch";
const CONTEXT: &str = "v2 ships today with offline mode";

/// Accepts `valid-<subject>` for the test audience.
struct FakeGoogle;

#[async_trait]
impl IdentityProvider for FakeGoogle {
    async fn verify(&self, raw_token: &str, expected_audience: &str) -> AppResult<IdentityClaims> {
        if expected_audience != CLIENT_ID {
            return Err(AppError::Validation("wrong audience".to_owned()));
        }
        let Some(subject) = raw_token.strip_prefix("valid-") else {
            return Err(AppError::Validation("bad signature".to_owned()));
        };

        IdentityClaims::new(
            subject,
            format!("{subject}@example.com"),
            Some("Test User".to_owned()),
            None,
        )
    }
}

/// Replies with the user prompt so tests can see what reached the backend.
struct EchoGenerator;

#[async_trait]
impl ContentGenerator for EchoGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> AppResult<String> {
        Ok(format!("post for: {}", prompt.user))
    }
}

fn test_router(max_attempts: u32) -> Router {
    let codec = match JwtSessionTokenCodec::new("router-test-secret", "HS256") {
        Ok(codec) => codec,
        Err(error) => panic!("codec should build: {error}"),
    };
    let session_token_service = SessionTokenService::new(Arc::new(codec), 30);
    let identity_service = IdentityService::new(
        Arc::new(FakeGoogle),
        Arc::new(InMemoryUserRepository::new()),
        session_token_service.clone(),
        CLIENT_ID,
    );
    let posts = Arc::new(InMemoryPostRepository::new());

    let trusted_proxies: Vec<IpNet> = Vec::new();
    let app_state = AppState {
        rate_limit_service: RateLimitService::new(Arc::new(InMemoryRateLimitRepository::new())),
        rate_limit_rule: RateLimitRule::new(max_attempts, 60),
        session_token_service,
        identity_service,
        generation_service: GenerationService::new(Arc::new(EchoGenerator), posts.clone()),
        post_service: PostService::new(posts),
        trusted_proxies: trusted_proxies.into(),
    };

    match build_router(app_state, &["http://localhost:3000".to_owned()]) {
        Ok(router) => router,
        Err(error) => panic!("router should build: {error}"),
    }
}

fn from_peer(mut request: Request<Body>, peer: [u8; 4]) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((peer, 40_000))));
    request
}

fn with_bearer(
    builder: axum::http::request::Builder,
    bearer: Option<&str>,
) -> axum::http::request::Builder {
    match bearer {
        Some(bearer) => builder.header(header::AUTHORIZATION, bearer),
        None => builder,
    }
}

fn json_request(method: &str, uri: &str, body: &str, bearer: Option<&str>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    with_bearer(builder, bearer)
        .body(Body::from(body.to_owned()))
        .unwrap_or_default()
}

fn login_request(google_token: &str) -> Request<Body> {
    json_request(
        "POST",
        "/api/auth/google",
        &json!({ "token": google_token }).to_string(),
        None,
    )
}

fn empty_request(method: &str, uri: &str, bearer: Option<&str>) -> Request<Body> {
    with_bearer(Request::builder().method(method).uri(uri), bearer)
        .body(Body::empty())
        .unwrap_or_default()
}

fn multipart_body(fields: &[(&str, &str)], documents: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (file_name, bytes) in documents {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"documents\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn generate_form(
    fields: &[(&str, &str)],
    documents: &[(&str, &[u8])],
    bearer: Option<&str>,
) -> Request<Body> {
    let builder = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    with_bearer(builder, bearer)
        .body(Body::from(multipart_body(fields, documents)))
        .unwrap_or_default()
}

fn generate_request(bearer: Option<&str>) -> Request<Body> {
    generate_form(
        &[
            ("template", "tech-insight"),
            ("objective", OBJECTIVE),
            ("context", CONTEXT),
        ],
        &[],
        bearer,
    )
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let Ok(response) = router.clone().oneshot(request).await else {
        panic!("router should respond");
    };
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn sign_in(router: &Router, subject: &str, peer: [u8; 4]) -> String {
    let (status, body) = send(
        router,
        from_peer(login_request(&format!("valid-{subject}")), peer),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    format!("Bearer {}", body["token"].as_str().unwrap_or_default())
}

#[tokio::test]
async fn health_reports_ok() {
    let router = test_router(30);
    let (status, body) = send(&router, empty_request("GET", "/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn google_login_issues_a_session_token_usable_on_me() {
    let router = test_router(30);

    let (status, body) = send(&router, from_peer(login_request("valid-g-1"), [192, 0, 2, 1])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "g-1@example.com");
    assert_eq!(body["user"]["name"], "Test User");
    let token = body["token"].as_str().unwrap_or_default().to_owned();
    assert!(!token.is_empty());

    let bearer = format!("Bearer {token}");
    let (status, me) = send(&router, empty_request("GET", "/api/auth/me", Some(bearer.as_str()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], body["user"]["id"]);
}

#[tokio::test]
async fn repeated_login_resolves_the_same_user() {
    let router = test_router(30);
    let login = || from_peer(login_request("valid-g-2"), [192, 0, 2, 2]);

    let (_, first) = send(&router, login()).await;
    let (_, second) = send(&router, login()).await;

    assert_eq!(first["user"]["id"], second["user"]["id"]);
}

#[tokio::test]
async fn rejected_identity_is_unauthorized_with_generic_message() {
    let router = test_router(30);
    let (status, body) = send(&router, from_peer(login_request("forged"), [192, 0, 2, 3])).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid identity token");
}

#[tokio::test]
async fn malformed_login_body_gets_the_json_error_envelope() {
    let router = test_router(30);

    for body in ["{not json", r#"{"credential":"x"}"#] {
        let request = json_request("POST", "/api/auth/google", body, None);
        let (status, body) = send(&router, from_peer(request, [192, 0, 2, 9])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().is_some_and(|message| !message.is_empty()));
    }
}

#[tokio::test]
async fn me_requires_a_well_formed_valid_bearer_token() {
    let router = test_router(30);

    for (authorization, message) in [
        (None, "missing or invalid authorization header"),
        (Some("Token abc"), "missing or invalid authorization header"),
        (Some("Bearer "), "missing or invalid authorization header"),
        (Some("Bearer not.a.jwt"), "invalid token"),
    ] {
        let (status, body) =
            send(&router, empty_request("GET", "/api/auth/me", authorization)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], message);
    }
}

#[tokio::test]
async fn generate_degrades_to_anonymous_on_bad_or_missing_token() {
    let router = test_router(30);

    for bearer in [None, Some("Bearer garbage")] {
        let (status, body) = send(&router, from_peer(generate_request(bearer), [192, 0, 2, 4])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], "tech-insight");
        assert!(
            body["post"]
                .as_str()
                .is_some_and(|post| post.contains(OBJECTIVE))
        );
    }
}

#[tokio::test]
async fn generate_with_valid_token_is_recorded_in_the_callers_history() {
    let router = test_router(30);
    let peer = [192, 0, 2, 10];
    let bearer = sign_in(&router, "g-10", peer).await;

    let (status, generated) =
        send(&router, from_peer(generate_request(Some(bearer.as_str())), peer)).await;
    assert_eq!(status, StatusCode::OK);

    // An anonymous generation from the same address is not the caller's.
    let (status, _) = send(&router, from_peer(generate_request(None), peer)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, history) = send(&router, empty_request("GET", "/api/history", Some(bearer.as_str()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["total"], 1);
    assert_eq!(history["page"], 1);
    assert_eq!(history["totalPages"], 1);
    assert_eq!(history["posts"][0]["id"], generated["id"]);
    assert_eq!(history["posts"][0]["objective"], OBJECTIVE);
    assert_eq!(history["posts"][0]["generated_content"], generated["post"]);
}

#[tokio::test]
async fn generate_validates_template_and_lengths() {
    let router = test_router(30);

    for fields in [
        [("template", "haiku"), ("objective", OBJECTIVE), ("context", CONTEXT)],
        [("template", "tech-insight"), ("objective", "short"), ("context", CONTEXT)],
        [("template", "tech-insight"), ("objective", OBJECTIVE), ("context", "tiny")],
    ] {
        let (status, body) =
            send(&router, from_peer(generate_form(&fields, &[], None), [192, 0, 2, 5])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    let missing_context = generate_form(
        &[("template", "tech-insight"), ("objective", OBJECTIVE)],
        &[],
        None,
    );
    let (status, body) = send(&router, from_peer(missing_context, [192, 0, 2, 5])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.contains("context"))
    );
}

#[tokio::test]
async fn generate_rejects_json_bodies_with_the_error_envelope() {
    let router = test_router(30);
    let body = json!({ "template": "tech-insight", "objective": OBJECTIVE, "context": CONTEXT });
    let request = json_request("POST", "/api/generate", &body.to_string(), None);

    let (status, body) = send(&router, from_peer(request, [192, 0, 2, 6])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn uploaded_documents_reach_the_prompt_and_binary_files_are_skipped() {
    let router = test_router(30);
    let fields = [
        ("template", "product-launch"),
        ("objective", OBJECTIVE),
        ("context", CONTEXT),
    ];
    let documents: [(&str, &[u8]); 2] = [
        ("notes.txt", b"offline sync landed in March"),
        ("logo.bin", &[0xff, 0xfe, 0x00, 0x9f]),
    ];

    let (status, body) = send(
        &router,
        from_peer(generate_form(&fields, &documents, None), [192, 0, 2, 7]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let post = body["post"].as_str().unwrap_or_default();
    assert!(post.contains("Document 1:\noffline sync landed in March"));
    assert!(!post.contains("Document 2:"));
}

#[tokio::test]
async fn oversized_documents_are_rejected() {
    let router = test_router(30);
    let fields = [
        ("template", "product-launch"),
        ("objective", OBJECTIVE),
        ("context", CONTEXT),
    ];
    let big = vec![b'a'; 50 * 1024 + 1];
    let chunk = vec![b'a'; 50 * 1024];

    let single: [(&str, &[u8]); 1] = [("big.txt", big.as_slice())];
    let (status, body) = send(
        &router,
        from_peer(generate_form(&fields, &single, None), [192, 0, 2, 8]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.contains("big.txt"))
    );

    let five: [(&str, &[u8]); 5] = [
        ("1.txt", chunk.as_slice()),
        ("2.txt", chunk.as_slice()),
        ("3.txt", chunk.as_slice()),
        ("4.txt", chunk.as_slice()),
        ("5.txt", chunk.as_slice()),
    ];
    let (status, body) = send(
        &router,
        from_peer(generate_form(&fields, &five, None), [192, 0, 2, 8]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.contains("200KB"))
    );
}

#[tokio::test]
async fn saved_posts_can_be_listed_searched_and_deleted_by_their_owner() {
    let router = test_router(30);
    let peer = [192, 0, 2, 11];
    let ana = sign_in(&router, "ana", peer).await;
    let bob = sign_in(&router, "bob", peer).await;

    for objective in ["Quarterly earnings recap", "Hiring update"] {
        let body = json!({
            "template": "industry-update",
            "objective": objective,
            "context": "internal notes",
            "generated_content": format!("{objective} body"),
        });
        let request = json_request("POST", "/api/posts", &body.to_string(), Some(ana.as_str()));
        let (status, saved) = send(&router, from_peer(request, peer)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["objective"], objective);
    }

    let (status, page) = send(
        &router,
        empty_request("GET", "/api/history?limit=1&skip=1", Some(ana.as_str())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["page"], 2);
    assert_eq!(page["totalPages"], 2);

    let (_, searched) = send(
        &router,
        empty_request("GET", "/api/history?search=EARNINGS", Some(ana.as_str())),
    )
    .await;
    assert_eq!(searched["total"], 1);
    let post_id = searched["posts"][0]["id"].as_str().unwrap_or_default().to_owned();

    let (_, bobs) = send(&router, empty_request("GET", "/api/history", Some(bob.as_str()))).await;
    assert_eq!(bobs["total"], 0);

    let uri = format!("/api/posts/{post_id}");
    let (status, _) = send(&router, from_peer(empty_request("DELETE", &uri, Some(bob.as_str())), peer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, deleted) =
        send(&router, from_peer(empty_request("DELETE", &uri, Some(ana.as_str())), peer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "post deleted successfully");

    let (_, remaining) = send(&router, empty_request("GET", "/api/history", Some(ana.as_str()))).await;
    assert_eq!(remaining["total"], 1);
}

#[tokio::test]
async fn post_routes_require_a_session() {
    let router = test_router(30);
    let save = json_request(
        "POST",
        "/api/posts",
        &json!({ "template": "tech-insight", "objective": "o", "generated_content": "c" })
            .to_string(),
        None,
    );

    for request in [
        empty_request("GET", "/api/history", None),
        save,
        empty_request("DELETE", "/api/posts/4a6f0d1e-6f0c-4a3e-9f53-1f0b0c1d2e3f", None),
    ] {
        let (status, body) = send(&router, from_peer(request, [192, 0, 2, 12])).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "missing or invalid authorization header");
    }
}

#[tokio::test]
async fn bad_history_and_delete_parameters_get_the_json_error_envelope() {
    let router = test_router(30);
    let peer = [192, 0, 2, 13];
    let bearer = sign_in(&router, "g-13", peer).await;

    for uri in ["/api/history?limit=0", "/api/history?limit=101", "/api/history?skip=-1"] {
        let (status, body) = send(&router, empty_request("GET", uri, Some(bearer.as_str()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }

    let request = empty_request("DELETE", "/api/posts/not-a-uuid", Some(bearer.as_str()));
    let (status, body) = send(&router, from_peer(request, peer)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn generate_is_throttled_per_client_address() {
    let router = test_router(2);
    let request = |peer| from_peer(generate_request(None), peer);

    assert_eq!(send(&router, request([198, 51, 100, 1])).await.0, StatusCode::OK);
    assert_eq!(send(&router, request([198, 51, 100, 1])).await.0, StatusCode::OK);

    let (status, body) = send(&router, request([198, 51, 100, 1])).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["message"], "too many requests, please try again later");

    assert_eq!(send(&router, request([198, 51, 100, 2])).await.0, StatusCode::OK);
}

#[tokio::test]
async fn requests_without_peer_address_share_the_unknown_bucket() {
    let router = test_router(1);

    let first = send(&router, generate_request(None)).await;
    let second = send(&router, generate_request(None)).await;

    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn login_and_generate_draw_on_one_budget() {
    let router = test_router(1);
    let peer = [203, 0, 113, 7];

    assert_eq!(
        send(&router, from_peer(login_request("valid-g-3"), peer)).await.0,
        StatusCode::OK
    );
    assert_eq!(
        send(&router, from_peer(generate_request(None), peer)).await.0,
        StatusCode::TOO_MANY_REQUESTS
    );

    // Reads are not throttled.
    assert_eq!(
        send(&router, from_peer(empty_request("GET", "/health", None), peer)).await.0,
        StatusCode::OK
    );
}

#[tokio::test]
async fn saving_and_deleting_posts_count_against_the_same_budget() {
    let router = test_router(2);
    let peer = [203, 0, 113, 8];
    let bearer = sign_in(&router, "g-4", peer).await;

    let save = |bearer: &str| {
        json_request(
            "POST",
            "/api/posts",
            &json!({
                "template": "startup-story",
                "objective": "Our first hire",
                "generated_content": "We hired our first engineer.",
            })
            .to_string(),
            Some(bearer),
        )
    };

    assert_eq!(send(&router, from_peer(save(&bearer), peer)).await.0, StatusCode::OK);
    assert_eq!(
        send(&router, from_peer(save(&bearer), peer)).await.0,
        StatusCode::TOO_MANY_REQUESTS
    );
}
