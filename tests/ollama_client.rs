//! Ollama client tests against a mock server.

mod common;

use movie_search::config::{load_config, LoadOptions};
use movie_search::llm::{Embedder, LlmClient, LlmConfig, LlmError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::EchoEmbeddings;

fn client_for(server: &MockServer) -> LlmClient {
    let config = LlmConfig::default()
        .with_endpoint(&server.uri())
        .with_model("nomic-embed-text");
    LlmClient::new(config).unwrap()
}

#[tokio::test]
async fn embed_sends_model_and_single_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_json(json!({
            "model": "nomic-embed-text",
            "input": ["stuck in a time loop"]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[0.25, -0.5, 1.0]]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let embedding = client_for(&server)
        .embed("stuck in a time loop")
        .await
        .unwrap();
    assert_eq!(embedding, vec![0.25, -0.5, 1.0]);
}

#[tokio::test]
async fn configured_endpoint_with_trailing_slash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(EchoEmbeddings)
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("moviesearch.toml");
    std::fs::write(
        &config_path,
        format!("[ollama]\nendpoint = \"{}/\"\n", server.uri()),
    )
    .unwrap();
    let config = load_config(LoadOptions {
        config_path: Some(config_path),
    })
    .await
    .unwrap();

    let client = LlmClient::new(config.ollama).unwrap();
    let embedding = client.embed("hello").await.unwrap();
    assert_eq!(embedding, vec![5.0, 1.0, 0.5]);
}

#[tokio::test]
async fn embed_batch_keeps_input_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(EchoEmbeddings)
        .mount(&server)
        .await;

    let texts = vec!["a".to_string(), "abc".to_string(), "ab".to_string()];
    let embeddings = client_for(&server).embed_batch(&texts).await.unwrap();
    let lengths: Vec<f32> = embeddings.iter().map(|e| e[0]).collect();
    assert_eq!(lengths, vec![1.0, 3.0, 2.0]);
}

#[tokio::test]
async fn embed_batch_rejects_count_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[0.1, 0.2]]})),
        )
        .mount(&server)
        .await;

    let texts = vec!["one".to_string(), "two".to_string()];
    let err = client_for(&server).embed_batch(&texts).await.unwrap_err();
    assert!(matches!(
        err,
        LlmError::CountMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

#[tokio::test]
async fn empty_vector_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embeddings": [[]]})))
        .mount(&server)
        .await;

    let err = client_for(&server).embed("anything").await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyEmbedding));
}

#[tokio::test]
async fn missing_model_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": "model \"nomic-embed-text\" not found, try pulling it first"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).embed("anything").await.unwrap_err();
    assert!(matches!(err, LlmError::ModelNotFound(ref m) if m == "nomic-embed-text"));
}

#[tokio::test]
async fn server_error_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(500).set_body_string("out of memory"))
        .mount(&server)
        .await;

    let err = client_for(&server).embed("anything").await.unwrap_err();
    match err {
        LlmError::Api(message) => assert!(message.contains("out of memory")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn list_models_error_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(503).set_body_string("loading models"))
        .mount(&server)
        .await;

    let err = client_for(&server).list_models().await.unwrap_err();
    match err {
        LlmError::Api(message) => {
            assert!(message.contains("503"));
            assert!(message.contains("loading models"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn lists_models_and_reports_availability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                {"name": "nomic-embed-text:latest", "size": 274302450},
                {"name": "llama3.2:3b", "size": 2019393189u64}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.is_available().await);
    assert_eq!(
        client.list_models().await.unwrap(),
        vec!["nomic-embed-text:latest", "llama3.2:3b"]
    );
}

#[tokio::test]
async fn unreachable_server_is_unavailable() {
    let config = LlmConfig::default().with_endpoint("http://127.0.0.1:9");
    let client = LlmClient::new(config).unwrap();
    assert!(!client.is_available().await);
    assert!(matches!(
        client.embed("anything").await,
        Err(LlmError::Connection(_))
    ));
}
