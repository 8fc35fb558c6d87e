//! `HttpNodeApi` against an in-process HTTP server

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use nodeman::api::{ApiError, HttpNodeApi, NodeApi};
use nodeman::models::{ApiConfig, NodeDraft};

async fn serve(router: Router) -> HttpNodeApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    HttpNodeApi::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 5,
    })
    .unwrap()
}

fn list_router(body: &'static str) -> Router {
    Router::new().route("/api/nodes", get(move || async move { body }))
}

fn draft(name: &str, password: Option<&str>) -> NodeDraft {
    NodeDraft {
        name: name.to_string(),
        port: 22,
        user: "ohara".to_string(),
        password: password.map(str::to_string),
    }
}

#[tokio::test]
async fn fetch_envelope() {
    let api = serve(list_router(
        r#"{"result":[{"name":"n2","port":22,"services":[{"name":"zk","clusterNames":["c1"]}]},{"name":"n1"}]}"#,
    ))
    .await;

    let nodes = api.fetch_nodes().await.unwrap().result.unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].name, "n2");
    assert_eq!(nodes[0].services[0].cluster_names, ["c1"]);
}

#[tokio::test]
async fn fetch_bare_array() {
    let api = serve(list_router(r#"[{"name":"n1","user":"admin"}]"#)).await;
    let nodes = api.fetch_nodes().await.unwrap().result.unwrap();
    assert_eq!(nodes[0].user.as_deref(), Some("admin"));
}

#[tokio::test]
async fn fetch_null_result() {
    let api = serve(list_router(r#"{"result":null}"#)).await;
    assert_eq!(api.fetch_nodes().await.unwrap().result, None);
}

#[tokio::test]
async fn fetch_schema_violation_is_decode_error() {
    let api = serve(list_router(r#"{"result":[{"port":22}]}"#)).await;
    assert!(matches!(api.fetch_nodes().await, Err(ApiError::Decode(_))));
}

#[tokio::test]
async fn fetch_server_error_is_status_error() {
    let router = Router::new().route(
        "/api/nodes",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let api = serve(router).await;

    match api.fetch_nodes().await {
        Err(ApiError::Status { status, body }) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn create_posts_draft() {
    let router = Router::new().route(
        "/api/nodes",
        get(|| async { "[]" }).post(|Json(body): Json<Value>| async move {
            assert_eq!(body["password"], "secret");
            Json(json!({
                "name": body["name"],
                "port": body["port"],
                "user": body["user"],
                "lastModified": 1_700_000_000_000_i64,
            }))
        }),
    );
    let api = serve(router).await;

    let node = api.create_node(&draft("node9", Some("secret"))).await.unwrap();
    assert_eq!(node.name, "node9");
    assert_eq!(node.port, Some(22));
    assert!(node.last_modified_local().is_some());
}

#[tokio::test]
async fn update_puts_to_encoded_name_without_password() {
    let router = Router::new().route(
        "/api/nodes/{name}",
        put(|Path(name): Path<String>, Json(body): Json<Value>| async move {
            if body.get("password").is_some() {
                return Err((StatusCode::BAD_REQUEST, "password must be omitted"));
            }
            Ok(Json(json!({ "name": name, "user": body["user"], "port": body["port"] })))
        }),
    );
    let api = serve(router).await;

    let node = api.update_node("host a", &draft("host a", None)).await.unwrap();
    assert_eq!(node.name, "host a");
    assert_eq!(node.user.as_deref(), Some("ohara"));
}

#[tokio::test]
async fn update_rejected_keeps_body() {
    let router = Router::new().route(
        "/api/nodes/{name}",
        put(|| async { (StatusCode::CONFLICT, "node is in use") }),
    );
    let api = serve(router).await;

    let err = api.update_node("n1", &draft("n1", None)).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 409 Conflict: node is in use");
}
