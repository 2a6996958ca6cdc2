use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::auth::TokenKeys;
use crate::workflows::applications::{application_router, TrackerService};

fn request(method: Method, uri: &str, auth: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    (status, read_json_body(response).await)
}

#[tokio::test]
async fn missing_authorization_is_unauthorized() {
    let (store, _, _) = seeded_store();
    let router = router_for(&store, token_keys());

    let (status, body) = send(&router, request(Method::GET, "/api/applications", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["category"], "unauthorized");
}

#[tokio::test]
async fn invalid_or_foreign_tokens_are_forbidden() {
    let (store, casey, _) = seeded_store();
    let router = router_for(&store, token_keys());
    let foreign = TokenKeys::new("some-other-secret", chrono::Duration::hours(1));

    for auth in [
        "Bearer not-a-jwt".to_string(),
        "Basic Y2FzZXk6c2VjcmV0".to_string(),
        bearer(&foreign, &casey),
    ] {
        let (status, body) = send(
            &router,
            request(Method::GET, "/api/stats/summary", Some(&auth), None),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "auth header {auth}");
        assert_eq!(body["category"], "forbidden");
    }
}

#[tokio::test]
async fn application_lifecycle_over_http() {
    let (store, casey, _) = seeded_store();
    let keys = token_keys();
    let router = router_for(&store, Arc::clone(&keys));
    let auth = bearer(&keys, &casey);

    let (status, created) = send(
        &router,
        request(
            Method::POST,
            "/api/applications",
            Some(&auth),
            Some(json!({
                "company": { "kind": "existing", "companyId": A_RATED.0 },
                "role": "Platform Engineer",
                "appliedDate": "2025-03-01",
                "notes": "Met the team at a meetup"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "APPLIED");
    assert_eq!(created["company"]["name"], "Acme Analytics");
    assert_eq!(created["updates"][0]["note"], "Initial note: Met the team at a meetup");
    let id = created["id"].as_i64().expect("numeric id");

    let (status, updated) = send(
        &router,
        request(
            Method::PUT,
            &format!("/api/applications/{id}"),
            Some(&auth),
            Some(json!({ "status": "INTERVIEW", "followUpDate": "2025-03-10" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "INTERVIEW");
    assert_eq!(updated["updates"].as_array().expect("updates").len(), 2);
    assert_eq!(
        updated["updates"][0]["note"],
        "Status changed from APPLIED to INTERVIEW"
    );

    let (status, note) = send(
        &router,
        request(
            Method::POST,
            &format!("/api/applications/{id}/updates"),
            Some(&auth),
            Some(json!({ "note": "Second round booked" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["kind"], "manual");

    let (status, listing) = send(
        &router,
        request(Method::GET, "/api/applications", Some(&auth), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().expect("list").len(), 1);
    assert_eq!(listing[0]["company"]["town"], "London");

    let (status, summary) = send(
        &router,
        request(Method::GET, "/api/stats/summary", Some(&auth), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total"], 1);
    assert_eq!(summary["interviewRate"], 100);
    assert_eq!(summary["followUpsDue"], 1);

    let (status, prediction) = send(
        &router,
        request(
            Method::GET,
            &format!("/api/predict/{}", A_RATED.0),
            Some(&auth),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prediction["interviewProbability"], 0.99);
    assert_eq!(prediction["sampleSize"], 1);

    let (status, _) = send(
        &router,
        request(
            Method::DELETE,
            &format!("/api/applications/{id}"),
            Some(&auth),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &router,
        request(
            Method::GET,
            &format!("/api/applications/{id}"),
            Some(&auth),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["category"], "not_found");
}

#[tokio::test]
async fn malformed_payloads_are_validation_errors() {
    let (store, casey, _) = seeded_store();
    let keys = token_keys();
    let router = router_for(&store, Arc::clone(&keys));
    let auth = bearer(&keys, &casey);

    let bad_bodies = [
        json!({ "company": { "kind": "existing", "companyId": 1 }, "role": "Analyst", "status": "Interviewing" }),
        json!({ "company": { "kind": "existing", "companyId": 1 }, "role": "Analyst", "appliedDate": "03/01/2025" }),
        json!({ "company": { "kind": "partner", "companyId": 1 }, "role": "Analyst" }),
        json!({ "company": { "kind": "existing", "companyId": 1 }, "role": "  " }),
    ];
    for body in bad_bodies {
        let (status, payload) = send(
            &router,
            request(Method::POST, "/api/applications", Some(&auth), Some(body.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {body}");
        assert_eq!(payload["category"], "validation");
    }

    let (status, _) = send(
        &router,
        request(Method::GET, "/api/applications/not-a-number", Some(&auth), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn foreign_applications_look_missing() {
    let (store, casey, robin) = seeded_store();
    let keys = token_keys();
    let router = router_for(&store, Arc::clone(&keys));
    let id = tracker(&store)
        .create(casey.id, request_for(A_RATED, "Analyst"))
        .expect("created")
        .application
        .id;
    let robin_auth = bearer(&keys, &robin);

    let attempts = [
        request(Method::GET, &format!("/api/applications/{id}"), Some(&robin_auth), None),
        request(
            Method::PUT,
            &format!("/api/applications/{id}"),
            Some(&robin_auth),
            Some(json!({ "status": "WITHDRAWN" })),
        ),
        request(
            Method::POST,
            &format!("/api/applications/{id}/updates"),
            Some(&robin_auth),
            Some(json!({ "note": "not mine" })),
        ),
        request(Method::DELETE, &format!("/api/applications/{id}"), Some(&robin_auth), None),
    ];
    for attempt in attempts {
        let (status, body) = send(&router, attempt).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["category"], "not_found");
    }
}

#[tokio::test]
async fn predicting_a_missing_company_is_not_found() {
    let (store, casey, _) = seeded_store();
    let keys = token_keys();
    let router = router_for(&store, Arc::clone(&keys));
    let auth = bearer(&keys, &casey);

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/predict/9999", Some(&auth), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "company 9999 not found");
}

#[tokio::test]
async fn repository_failures_hide_detail_when_not_exposed() {
    let (_, casey, _) = seeded_store();
    let keys = token_keys();
    let offline = Arc::new(UnavailableStore);
    let service = Arc::new(TrackerService::new(Arc::clone(&offline), Arc::clone(&offline)));
    let router = application_router(service, Arc::clone(&keys), false);
    let auth = bearer(&keys, &casey);

    let (status, body) = send(
        &router,
        request(Method::GET, "/api/applications", Some(&auth), None),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["category"], "internal");
    assert_eq!(body["error"], "an internal server error occurred");
}
