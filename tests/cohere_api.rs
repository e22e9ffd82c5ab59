//! Wire-level tests for the embedding and completion clients.

use std::sync::Arc;

use httpmock::prelude::*;
use serde_json::json;

use corpusmith::embedding::{
    CohereEmbedder, EmbeddingProvider, query_embedding_or_zero,
};
use corpusmith::responder::{
    CohereChatClient, CompletionProvider, FALLBACK_ANSWER, Responder,
};
use corpusmith::types::RagError;

fn embedder_for(server: &MockServer) -> CohereEmbedder {
    CohereEmbedder::new(reqwest::Client::new(), "test-key").with_base_url(server.base_url())
}

#[tokio::test]
async fn embed_documents_sends_document_input_type() {
    let server = MockServer::start_async().await;
    let embed = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/embed")
                .header("authorization", "Bearer test-key")
                .json_body_partial(
                    r#"{"model": "embed-multilingual-v3.0", "input_type": "search_document"}"#,
                );
            then.status(200)
                .json_body(json!({"embeddings": [[0.1, 0.2], [0.3, 0.4]]}));
        })
        .await;

    let texts = vec!["first chunk".to_string(), "second chunk".to_string()];
    let vectors = embedder_for(&server).embed_documents(&texts).await.unwrap();

    assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    embed.assert_async().await;
}

#[tokio::test]
async fn embed_query_sends_query_input_type() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/embed")
                .json_body_partial(r#"{"input_type": "search_query"}"#);
            then.status(200).json_body(json!({"embeddings": [[1.0, 2.0]]}));
        })
        .await;

    let vector = embedder_for(&server)
        .embed_query("what is chapter one about?")
        .await
        .unwrap();
    assert_eq!(vector, vec![1.0, 2.0]);
}

#[tokio::test]
async fn embedding_count_mismatch_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embed");
            then.status(200).json_body(json!({"embeddings": [[0.5, 0.5]]}));
        })
        .await;

    let texts = vec!["one".to_string(), "two".to_string()];
    let result = embedder_for(&server).embed_documents(&texts).await;
    assert!(matches!(result, Err(RagError::Embedding(_))));
}

#[tokio::test]
async fn empty_document_batch_skips_the_network() {
    let server = MockServer::start_async().await;
    let embed = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embed");
            then.status(200).json_body(json!({"embeddings": []}));
        })
        .await;

    let vectors = embedder_for(&server).embed_documents(&[]).await.unwrap();
    assert!(vectors.is_empty());
    assert_eq!(embed.hits_async().await, 0);
}

#[tokio::test]
async fn provider_outage_degrades_query_embedding_to_zeros() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embed");
            then.status(500);
        })
        .await;

    let embedder = embedder_for(&server).with_model("embed-multilingual-v3.0", 4);
    let vector = query_embedding_or_zero(&embedder, "anything").await;
    assert_eq!(vector, vec![0.0; 4]);
}

#[tokio::test]
async fn chat_completion_returns_trimmed_text() {
    let server = MockServer::start_async().await;
    let chat = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat")
                .header("authorization", "Bearer test-key")
                .json_body_partial(r#"{"model": "command"}"#);
            then.status(200)
                .json_body(json!({"text": "  The hero prevails in the end.  "}));
        })
        .await;

    let client = CohereChatClient::new(reqwest::Client::new(), "test-key")
        .with_base_url(server.base_url());
    let raw = client.complete("prompt").await.unwrap();
    assert_eq!(raw, "  The hero prevails in the end.  ");

    let responder = Responder::new(Arc::new(client));
    let answer = responder
        .answer("who prevails?", &["context chunk".to_string()])
        .await;
    assert_eq!(answer, "The hero prevails in the end.");
    assert_eq!(chat.hits_async().await, 2);
}

#[tokio::test]
async fn chat_outage_returns_the_fallback_answer() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat");
            then.status(503);
        })
        .await;

    let client = CohereChatClient::new(reqwest::Client::new(), "test-key")
        .with_base_url(server.base_url());
    let responder = Responder::new(Arc::new(client));
    let answer = responder.answer("who prevails?", &[]).await;
    assert_eq!(answer, FALLBACK_ANSWER);
}

#[tokio::test]
async fn prompt_carries_retrieved_context_to_the_wire() {
    let server = MockServer::start_async().await;
    let chat = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat")
                .body_contains("the dragon sleeps under the mountain")
                .body_contains("Question: where does the dragon sleep?");
            then.status(200).json_body(json!({"text": "Under the mountain."}));
        })
        .await;

    let client = CohereChatClient::new(reqwest::Client::new(), "test-key")
        .with_base_url(server.base_url());
    let responder = Responder::new(Arc::new(client));
    let answer = responder
        .answer(
            "where does the dragon sleep?",
            &["the dragon sleeps under the mountain".to_string()],
        )
        .await;

    assert_eq!(answer, "Under the mountain.");
    chat.assert_async().await;
}
