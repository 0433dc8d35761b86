use anyhow::Result;
use bhe_query_import::core::transport::SAVED_QUERIES_URI;
use bhe_query_import::domain::model::Outcome;
use bhe_query_import::domain::ports::QuerySource;
use bhe_query_import::{
    Credentials, GitHubTreeSource, ImportError, ImportPipeline, JsonUrlSource, LocalFileSource,
    RateLimiter, ReqwestBackend, SignedTransport,
};
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

fn backend() -> ReqwestBackend {
    ReqwestBackend::new(Duration::from_secs(5)).unwrap()
}

fn pipeline(server: &MockServer) -> ImportPipeline<SignedTransport<ReqwestBackend>> {
    ImportPipeline::new(SignedTransport::new(
        &server.base_url(),
        Credentials::new("tid", "tkey"),
        RateLimiter::new(Duration::ZERO),
        backend(),
    ))
}

#[tokio::test]
async fn test_end_to_end_single_json_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("find-da.json");
    std::fs::write(
        &path,
        r#"{"name":"Find DA","query":"MATCH (n:Group) RETURN n","description":""}"#,
    )?;

    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/v2/saved-queries")
            .header("Authorization", "bhesignature tid")
            .body(r#"{"name":"Find DA","query":"MATCH (n:Group) RETURN n","description":""}"#);
        then.status(200).json_body(serde_json::json!({"data": {"id": 1}}));
    });

    let report = pipeline(&server).run(&LocalFileSource::new(&path)).await?;

    mock.assert();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].record.name, "Find DA");
    assert!(report.results[0].is_success());
    Ok(())
}

#[tokio::test]
async fn test_missing_file_makes_no_request() -> Result<()> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.path(SAVED_QUERIES_URI);
        then.status(200);
    });

    let err = pipeline(&server)
        .run(&LocalFileSource::new("/no/such/queries.yaml"))
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::NotFound { .. }));
    mock.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_local_file_stops_at_first_rejection() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("queries.yaml");
    std::fs::write(
        &path,
        "- name: first\n  query: RETURN 1\n- name: second\n  query: RETURN 2\n- name: third\n  query: RETURN 3\n",
    )?;

    let server = MockServer::start();
    let ok_first = server.mock(|when, then| {
        when.method(POST).path(SAVED_QUERIES_URI).body_contains(r#""name":"first""#);
        then.status(200).body("{}");
    });
    let rejected = server.mock(|when, then| {
        when.method(POST).path(SAVED_QUERIES_URI).body_contains(r#""name":"second""#);
        then.status(400).body("invalid query");
    });
    let third = server.mock(|when, then| {
        when.method(POST).path(SAVED_QUERIES_URI).body_contains(r#""name":"third""#);
        then.status(200).body("{}");
    });

    let report = pipeline(&server).run(&LocalFileSource::new(&path)).await?;

    ok_first.assert();
    rejected.assert();
    third.assert_hits(0);
    assert_eq!(report.results.len(), 2);
    let fatal = report.fatal.expect("batch should have stopped");
    assert_eq!(fatal.status(), Some(400));
    assert_eq!(fatal.response_text(), Some("invalid query"));
    Ok(())
}

#[tokio::test]
async fn test_json_url_isolates_failures() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/packs/queries.json");
        then.status(200).json_body(serde_json::json!([
            {"name": "first", "query": "RETURN 1"},
            {"name": "second", "query": "RETURN 2"},
            {"name": "third", "query": "RETURN 3"}
        ]));
    });
    server.mock(|when, then| {
        when.method(POST).path(SAVED_QUERIES_URI).body_contains(r#""name":"second""#);
        then.status(409).body("duplicate name");
    });
    let first = server.mock(|when, then| {
        when.method(POST).path(SAVED_QUERIES_URI).body_contains(r#""name":"first""#);
        then.status(200).body("{}");
    });
    let third = server.mock(|when, then| {
        when.method(POST).path(SAVED_QUERIES_URI).body_contains(r#""name":"third""#);
        then.status(200).body("{}");
    });

    let source = JsonUrlSource::new(&server.url("/packs/queries.json"), backend());
    let report = pipeline(&server).run(&source).await?;

    first.assert();
    third.assert();
    assert!(report.fatal.is_none());
    let names: Vec<&str> = report.results.iter().map(|r| r.record.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
    assert!(report.results[0].is_success());
    assert!(matches!(
        &report.results[1].outcome,
        Outcome::Failure(detail) if detail.status == Some(409)
    ));
    assert!(report.results[2].is_success());
    Ok(())
}

#[tokio::test]
async fn test_json_url_grouped_pack() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/compass.json");
        then.status(200).json_body(serde_json::json!({
            "queries": [{
                "name": "Shortest paths to DA",
                "category": "Dangerous Paths",
                "queryList": [
                    {"final": false, "query": "MATCH (d:Domain) RETURN d"},
                    {"final": true, "query": "MATCH p=shortestPath((u)-[*1..]->(g)) RETURN p"}
                ]
            }]
        }));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path(SAVED_QUERIES_URI).json_body(serde_json::json!({
            "name": "Shortest paths to DA - Dangerous Paths",
            "query": "MATCH p=shortestPath((u)-[*1..]->(g)) RETURN p",
            "description": "Category: Dangerous Paths"
        }));
        then.status(200).body("{}");
    });

    let source = JsonUrlSource::new(&server.url("/compass.json"), backend());
    let report = pipeline(&server).run(&source).await?;

    create.assert_hits(1);
    assert_eq!(report.succeeded(), 1);
    Ok(())
}

#[tokio::test]
async fn test_github_directory_listing() -> Result<()> {
    let server = MockServer::start();
    let listing = serde_json::json!([
        {"type": "file", "name": "ad.json", "download_url": server.url("/files/ad.json")},
        {"type": "file", "name": "sessions.cypher", "download_url": server.url("/files/sessions.cypher")},
        {"type": "file", "name": "README.md", "download_url": server.url("/files/README.md")},
        {"type": "dir", "name": "nested.json", "download_url": null}
    ]);
    server.mock(|when, then| {
        when.method(GET).path("/org/queries/main/cypher");
        then.status(200).json_body(listing);
    });
    server.mock(|when, then| {
        when.method(GET).path("/files/ad.json");
        then.status(200).body(
            r#"[{"name":"Domain Admins","query":"MATCH (g:Group) RETURN g"},{"name":"Computers","query":"MATCH (c:Computer) RETURN c"}]"#,
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/files/sessions.cypher");
        then.status(200)
            .body("MATCH p=(c:Computer)-[:HasSession]->(u:User) RETURN p\n");
    });
    let readme = server.mock(|when, then| {
        when.method(GET).path("/files/README.md");
        then.status(200).body("# docs");
    });
    let create = server.mock(|when, then| {
        when.method(POST).path(SAVED_QUERIES_URI);
        then.status(200).body("{}");
    });

    let source = GitHubTreeSource::new(&server.url("/org/queries"), "main", "cypher", backend());
    assert_eq!(source.describe(), format!("GitHub {} (main:cypher)", server.url("/org/queries")));
    let report = pipeline(&server).run(&source).await?;

    readme.assert_hits(0);
    create.assert_hits(3);
    let names: Vec<&str> = report.results.iter().map(|r| r.record.name.as_str()).collect();
    assert_eq!(names, vec!["Domain Admins", "Computers", "sessions"]);
    assert_eq!(
        report.results[2].record.description,
        "Query imported from sessions.cypher"
    );
    Ok(())
}

#[tokio::test]
async fn test_github_single_file() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/org/queries/dev/packs/owned.yaml");
        then.status(200)
            .body("name: Owned principals\nquery: MATCH (n {owned:true}) RETURN n\n");
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path(SAVED_QUERIES_URI)
            .body_contains(r#""name":"Owned principals""#);
        then.status(200).body("{}");
    });

    let source = GitHubTreeSource::new(&server.url("/org/queries"), "dev", "packs/owned.yaml", backend());
    let report = pipeline(&server).run(&source).await?;

    create.assert();
    assert_eq!(report.succeeded(), 1);
    Ok(())
}

#[tokio::test]
async fn test_github_listing_fetch_failure_surfaces() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/org/missing/main/");
        then.status(404).body("404: Not Found");
    });

    let source = GitHubTreeSource::new(&server.url("/org/missing"), "main", "", backend());
    let err = pipeline(&server).run(&source).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    Ok(())
}

#[tokio::test]
async fn test_github_download_failure_keeps_earlier_files() -> Result<()> {
    let server = MockServer::start();
    let listing = serde_json::json!([
        {"type": "file", "name": "a.cypher", "download_url": server.url("/files/a.cypher")},
        {"type": "file", "name": "b.cypher", "download_url": server.url("/files/b.cypher")},
        {"type": "file", "name": "c.cypher", "download_url": server.url("/files/c.cypher")}
    ]);
    server.mock(|when, then| {
        when.method(GET).path("/org/queries/main/packs");
        then.status(200).json_body(listing);
    });
    server.mock(|when, then| {
        when.method(GET).path("/files/a.cypher");
        then.status(200).body("MATCH (a) RETURN a");
    });
    server.mock(|when, then| {
        when.method(GET).path("/files/b.cypher");
        then.status(500).body("upstream error");
    });
    let never_fetched = server.mock(|when, then| {
        when.method(GET).path("/files/c.cypher");
        then.status(200).body("MATCH (c) RETURN c");
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path(SAVED_QUERIES_URI)
            .body_contains(r#""name":"a""#);
        then.status(200).body("{}");
    });

    let source = GitHubTreeSource::new(&server.url("/org/queries"), "main", "packs", backend());
    let report = pipeline(&server).run(&source).await?;

    create.assert_hits(1);
    never_fetched.assert_hits(0);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.results[0].record.query, "MATCH (a) RETURN a");
    let fatal = report.fatal.expect("download failure should stop the batch");
    assert_eq!(fatal.status(), Some(500));
    assert_eq!(fatal.response_text(), Some("upstream error"));
    Ok(())
}
