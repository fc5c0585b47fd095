//! Knowledge base tests against a mock server.

mod common;

use std::collections::HashMap;

use minds_client::{
    EmbeddingConfig, KnowledgeBaseConfig, KnowledgeBaseDocument, PreprocessingConfig,
    TextChunkingConfig, VectorStoreConfig,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_kb(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/knowledge_bases/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": name,
            "description": "docs",
        })))
        .mount(server)
        .await;
}

async fn mount_ingest(server: &MockServer, name: &str) {
    Mock::given(method("PUT"))
        .and(path(format!("/api/knowledge_bases/{}", name)))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_sends_flattened_body() {
    let server = MockServer::start().await;

    let mut embedding_params = serde_json::Map::new();
    embedding_params.insert("api_key".into(), json!("sk-abc"));
    let config = KnowledgeBaseConfig::new("my_kb", "docs")
        .with_vector_store(
            VectorStoreConfig::new(
                "pgvector",
                HashMap::from([("host".to_string(), json!("vec.internal"))]),
            )
            .with_table("kb_vectors"),
        )
        .with_embedding(
            EmbeddingConfig::new("openai", "text-embedding-3-small").with_params(embedding_params),
        );

    Mock::given(method("POST"))
        .and(path("/api/knowledge_bases"))
        .and(body_json(json!({
            "name": "my_kb",
            "description": "docs",
            "vector_store": {
                "engine": "pgvector",
                "connection_data": {"host": "vec.internal"},
                "table": "kb_vectors",
            },
            "embedding_model": {
                "provider": "openai",
                "name": "text-embedding-3-small",
                "api_key": "sk-abc",
            },
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    mount_kb(&server, "my_kb").await;

    let kb = common::client(&server)
        .knowledge_bases()
        .create(&config)
        .await
        .unwrap();
    assert_eq!(kb.name(), "my_kb");
}

#[tokio::test]
async fn test_list_and_get() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/knowledge_bases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "kb_one", "description": "a"},
            {"name": "kb_two", "description": "b", "vector_store": "pg"},
        ])))
        .mount(&server)
        .await;
    mount_kb(&server, "kb_one").await;
    Mock::given(method("GET"))
        .and(path("/api/knowledge_bases/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let kbs = common::client(&server).knowledge_bases();
    let names: Vec<String> = kbs
        .list()
        .await
        .unwrap()
        .iter()
        .map(|kb| kb.name().to_string())
        .collect();
    assert_eq!(names, ["kb_one", "kb_two"]);

    assert_eq!(kbs.get("kb_one").await.unwrap().name(), "kb_one");
    assert!(kbs.get("missing").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_drop_with_and_without_force() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/knowledge_bases/my_kb"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let kbs = common::client(&server).knowledge_bases();
    kbs.drop("my_kb", true).await.unwrap();
    kbs.drop("my_kb", false).await.unwrap();

    let deletes = common::requests_to(&server, "DELETE", "/api/knowledge_bases/my_kb").await;
    assert_eq!(common::body(&deletes[0]), json!({"cascade": true}));
    assert!(deletes[1].body.is_empty());
}

#[tokio::test]
async fn test_insert_from_select_body() {
    let server = MockServer::start().await;
    mount_kb(&server, "my_kb").await;
    mount_ingest(&server, "my_kb").await;

    let kb = common::client(&server)
        .knowledge_bases()
        .get("my_kb")
        .await
        .unwrap();
    kb.insert_from_select("SELECT * FROM example_ds.home_rentals", None)
        .await
        .unwrap();

    let puts = common::requests_to(&server, "PUT", "/api/knowledge_bases/my_kb").await;
    assert_eq!(
        common::body(&puts[0]),
        json!({"query": "SELECT * FROM example_ds.home_rentals"})
    );
}

#[tokio::test]
async fn test_insert_documents_body_with_preprocessing() {
    let server = MockServer::start().await;
    mount_kb(&server, "my_kb").await;
    mount_ingest(&server, "my_kb").await;

    let preprocessing = PreprocessingConfig::TextChunking(TextChunkingConfig {
        separators: vec!["\n".into()],
        chunk_size: 500,
        chunk_overlap: 50,
    });
    let kb = common::client(&server)
        .knowledge_bases()
        .get("my_kb")
        .await
        .unwrap();
    kb.insert_documents(
        vec![
            KnowledgeBaseDocument::new(1, "First document"),
            KnowledgeBaseDocument::new("doc-2", "Second document").with_metadata("source", "faq"),
        ],
        Some(&preprocessing),
    )
    .await
    .unwrap();

    let puts = common::requests_to(&server, "PUT", "/api/knowledge_bases/my_kb").await;
    assert_eq!(
        common::body(&puts[0]),
        json!({
            "rows": [
                {"id": 1, "content": "First document", "metadata": {}},
                {"id": "doc-2", "content": "Second document", "metadata": {"source": "faq"}},
            ],
            "preprocessing": {
                "type": "text_chunking",
                "text_chunking_config": {
                    "separators": ["\n"],
                    "chunk_size": 500,
                    "chunk_overlap": 50,
                },
            },
        })
    );
}

#[tokio::test]
async fn test_insert_urls_and_files_bodies() {
    let server = MockServer::start().await;
    mount_kb(&server, "my_kb").await;
    mount_ingest(&server, "my_kb").await;

    let kb = common::client(&server)
        .knowledge_bases()
        .get("my_kb")
        .await
        .unwrap();
    kb.insert_urls(vec!["https://docs.mdb.ai/docs/data_sources".into()], None)
        .await
        .unwrap();
    kb.insert_files(vec!["report.pdf".into(), "notes.txt".into()], None)
        .await
        .unwrap();

    let puts = common::requests_to(&server, "PUT", "/api/knowledge_bases/my_kb").await;
    assert_eq!(puts.len(), 2);
    assert_eq!(
        common::body(&puts[0]),
        json!({"urls": ["https://docs.mdb.ai/docs/data_sources"]})
    );
    assert_eq!(
        common::body(&puts[1]),
        json!({"files": ["report.pdf", "notes.txt"]})
    );
}
