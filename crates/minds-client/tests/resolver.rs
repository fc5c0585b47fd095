//! Reference resolution tests against a mock server.

mod common;

use minds_client::{
    DatasourceConfig, DatasourceEntry, DatasourceRef, DatasourceTableOverride, Error,
    KnowledgeBaseConfig, KnowledgeBaseRef, NameKind,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ds_json(name: &str) -> serde_json::Value {
    json!({"name": name, "engine": "postgres", "description": "d"})
}

#[tokio::test]
async fn test_missing_datasource_config_is_created_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/example_ds"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/example_ds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ds_json("example_ds")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/datasources"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let entry = common::client(&server)
        .resolver()
        .datasource(&DatasourceRef::from(DatasourceConfig::example()))
        .await
        .unwrap();
    assert_eq!(entry, DatasourceEntry::Name("example_ds".into()));
}

#[tokio::test]
async fn test_existing_datasource_config_is_not_recreated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/example_ds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "example_ds",
            "engine": "mysql",
            "description": "differs from the config",
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    common::client(&server)
        .resolver()
        .datasource(&DatasourceRef::from(DatasourceConfig::example()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_lookup_errors_other_than_not_found_propagate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/example_ds"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = common::client(&server)
        .resolver()
        .datasource(&DatasourceRef::from(DatasourceConfig::example()))
        .await
        .unwrap_err();
    assert!(err.is_server_error());
}

#[tokio::test]
async fn test_table_override_requires_existing_datasource() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/present"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ds_json("present")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/datasources/absent"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let resolver = common::client(&server).resolver();
    let entry = resolver
        .datasource(&DatasourceTableOverride::new("present", ["a", "b"]).into())
        .await
        .unwrap();
    assert_eq!(
        entry,
        DatasourceEntry::Restricted {
            name: "present".into(),
            tables: vec!["a".into(), "b".into()],
        }
    );

    let err = resolver
        .datasource(&DatasourceTableOverride::new("absent", ["a"]).into())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_knowledge_base_config_resolution() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/knowledge_bases/new_kb"))
        .respond_with(ResponseTemplate::new(404))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/knowledge_bases/new_kb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "new_kb"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/knowledge_bases"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let names = common::client(&server)
        .resolver()
        .knowledge_bases(&[
            KnowledgeBaseRef::from("plain_kb"),
            KnowledgeBaseRef::from(KnowledgeBaseConfig::new("new_kb", "docs")),
        ])
        .await
        .unwrap();
    assert_eq!(names, ["plain_kb", "new_kb"]);
}

#[tokio::test]
async fn test_invalid_datasource_config_is_rejected_before_lookup() {
    let server = MockServer::start().await;
    let reference: DatasourceRef = DatasourceConfig::new("bad name", "postgres", "d").into();

    let err = common::client(&server)
        .resolver()
        .datasource(&reference)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::NameInvalid {
            kind: NameKind::Datasource,
            ..
        }
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}
