//! End-to-end tests for the users API in single-process mode.

use reqwest::StatusCode;
use serde_json::{json, Value};
use simple_crud_api::config::AppConfig;

mod common;

fn ann() -> Value {
    json!({"username": "ann", "age": 30, "hobbies": ["chess", "go"]})
}

async fn create(server: &common::TestServer, body: &Value) -> Value {
    let response = common::client()
        .post(server.url("/api/users"))
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    common::json_body(response).await["data"].clone()
}

#[tokio::test]
async fn test_create_returns_201_with_id() {
    let server = common::start_standalone(AppConfig::default()).await;
    let client = common::client();

    let response = client
        .post(server.url("/api/users"))
        .json(&ann())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["content-type"], "application/json");

    let body = common::json_body(response).await;
    assert_eq!(body["statusCode"], 201);
    let user = &body["data"];
    assert!(uuid::Uuid::parse_str(user["id"].as_str().unwrap()).is_ok());
    assert_eq!(user["username"], "ann");
    assert_eq!(user["age"], 30);
    assert_eq!(user["hobbies"], json!(["chess", "go"]));

    // Round trip: the created user is visible in the list and by id.
    let list = common::json_body(client.get(server.url("/api/users")).send().await.unwrap()).await;
    assert_eq!(list, json!({"statusCode": 200, "data": [user]}));

    let id = user["id"].as_str().unwrap();
    let one = common::json_body(
        client
            .get(server.url(&format!("/api/users/{id}")))
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(one["data"], *user);
}

#[tokio::test]
async fn test_get_unknown_id_is_404() {
    let server = common::start_standalone(AppConfig::default()).await;

    let response = common::client()
        .get(server.url(&format!("/api/users/{}", uuid::Uuid::new_v4())))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        common::json_body(response).await,
        json!({"statusCode": 404, "errorMessage": "User not found"})
    );
}

#[tokio::test]
async fn test_put_malformed_id_is_400() {
    let server = common::start_standalone(AppConfig::default()).await;
    create(&server, &ann()).await;

    let response = common::client()
        .put(server.url("/api/users/123"))
        .json(&json!({"age": 40}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        common::json_body(response).await,
        json!({"statusCode": 400, "errorMessage": "Param \"id\" does not match \"UUID\" pattern"})
    );

    // Nothing was touched.
    let list = common::json_body(
        common::client().get(server.url("/api/users")).send().await.unwrap(),
    )
    .await;
    assert_eq!(list["data"][0]["age"], 30);
}

#[tokio::test]
async fn test_put_merges_fields() {
    let server = common::start_standalone(AppConfig::default()).await;
    let user = create(&server, &ann()).await;
    let id = user["id"].as_str().unwrap();

    let response = common::client()
        .put(server.url(&format!("/api/users/{id}")))
        .json(&json!({"age": 31}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated = common::json_body(response).await["data"].clone();
    assert_eq!(updated["id"], user["id"]);
    assert_eq!(updated["username"], "ann");
    assert_eq!(updated["age"], 31);
    assert_eq!(updated["hobbies"], user["hobbies"]);
}

#[tokio::test]
async fn test_delete_twice() {
    let server = common::start_standalone(AppConfig::default()).await;
    let user = create(&server, &ann()).await;
    let url = server.url(&format!("/api/users/{}", user["id"].as_str().unwrap()));
    let client = common::client();

    let first = client.delete(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);
    assert!(first.bytes().await.unwrap().is_empty());

    let second = client.delete(&url).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert_eq!(common::json_body(second).await["errorMessage"], "User not found");

    let get = client.get(&url).send().await.unwrap();
    assert_eq!(get.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors() {
    let server = common::start_standalone(AppConfig::default()).await;
    let client = common::client();

    let cases = [
        (
            json!({"username": "ann"}),
            "Must be specified all required fields: [username, age, hobbies]",
        ),
        (
            json!({"username": "ann", "age": 30, "hobbies": [], "role": "admin"}),
            "It has extra fields: [role]",
        ),
        (
            json!({"username": "ann", "age": 300, "hobbies": []}),
            "Field \"age\" must be more or equal \"1\" but less or equal than 100",
        ),
        (
            json!({"username": "ann", "age": 30, "hobbies": [1]}),
            "Field \"hobbies\" must have \"string\" type in array",
        ),
    ];

    for (body, message) in cases {
        let response = client
            .post(server.url("/api/users"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            common::json_body(response).await,
            json!({"statusCode": 400, "errorMessage": message})
        );
    }
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let server = common::start_standalone(AppConfig::default()).await;

    let response = common::client()
        .post(server.url("/api/users"))
        .header("content-type", "application/json")
        .body("{\"username\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        common::json_body(response).await["errorMessage"],
        "Incorrect data type. It must be like JSON structure"
    );
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let server = common::start_standalone(AppConfig::default()).await;
    let client = common::client();

    for path in ["/", "/api", "/api/users/a/b", "/api/posts"] {
        let response = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path: {path}");
        assert_eq!(
            common::json_body(response).await,
            json!({"statusCode": 404, "errorMessage": "Endpoint not found"})
        );
    }

    let response = client
        .patch(server.url("/api/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        common::json_body(response).await["errorMessage"],
        "\"PATCH\" forbidden. Available values: [GET, POST, PUT, DELETE]"
    );
}

#[tokio::test]
async fn test_body_over_limit_is_400() {
    let mut config = AppConfig::default();
    config.http.max_body_size = 64;
    let server = common::start_standalone(config).await;

    let hobbies: Vec<String> = (0..50).map(|i| format!("hobby-{i}")).collect();
    let response = common::client()
        .post(server.url("/api/users"))
        .json(&json!({"username": "ann", "age": 30, "hobbies": hobbies}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(common::json_body(response).await["statusCode"], 400);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = common::start_standalone(AppConfig::default()).await;

    let response = common::client()
        .get(server.url("/api/users"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}
