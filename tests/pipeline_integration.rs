use std::{collections::HashMap, fs, path::Path};

use cordindex::{
    config::{Config, ConfigOverrides},
    elastic::ElasticService,
    processing::{IndexingError, IndexingService},
    sink::SinkError,
};
use httpmock::{
    Method::{HEAD, POST, PUT},
    MockServer,
};
use serde_json::json;

const METADATA: &str = "\
cord_uid,sha,source_x,title,doi,abstract,publish_time,authors,journal,pdf_json_files,pmc_json_files,url
ug7v899j,s1,PMC,Clinical features of COVID-19 patients,10.1/a,We describe COVID-19 cases.,2020-02-01,\"Doe, J\",Lancet,document_parses/pdf_json/s1.json,document_parses/pmc_json/PMC1.xml.json,https://a
02tnwd4m,s2,PMC,Nitric oxide,10.1/b,,2000-08-15,\"Roe, R\",Resp Res,,,https://b
ug7v899j,s3,WHO,Clinical features of COVID-19 patients,,Short.,2020-02-01,\"Doe, J\",Lancet,,,https://a
";

fn write_json(root: &Path, relative: &str, texts: &[&str]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    let blocks: Vec<_> = texts
        .iter()
        .map(|text| json!({ "text": text, "section": "Body" }))
        .collect();
    fs::write(path, json!({ "paper_id": "p", "body_text": blocks }).to_string()).expect("write");
}

fn corpus() -> (tempfile::TempDir, std::path::PathBuf) {
    let root = tempfile::tempdir().expect("tempdir");
    let data_dir = root.path().join("cord19-2021-05-03");
    fs::create_dir_all(&data_dir).expect("mkdir");
    fs::write(data_dir.join("metadata.csv"), METADATA).expect("metadata");
    write_json(
        &data_dir,
        "document_parses/pmc_json/PMC1.xml.json",
        &["COVID-19 emerged in Wuhan.", "Patients were admitted."],
    );
    write_json(
        &data_dir,
        "document_parses/pdf_json/s1.json",
        &["pdf version mentioning covid"],
    );
    (root, data_dir)
}

fn config(server: &MockServer, data_dir: &Path, incl_abs: bool) -> Config {
    let env: HashMap<&str, String> = HashMap::from([("ELASTIC_URL", server.base_url())]);
    Config::from_lookup(|key| env.get(key).cloned())
        .expect("config")
        .with_overrides(ConfigOverrides {
            data_dir: Some(data_dir.to_path_buf()),
            batch_size: Some(1),
            incl_abs,
            ..Default::default()
        })
        .expect("overrides")
}

#[tokio::test]
async fn full_run_bootstraps_indexes_and_writes_bulk_batches() {
    let server = MockServer::start_async().await;
    let (_root, data_dir) = corpus();

    let heads = server
        .mock_async(|when, then| {
            when.method(HEAD);
            then.status(404);
        })
        .await;
    let mut creates = Vec::new();
    for index in ["/papers", "/paragraphs", "/abstracts"] {
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT).path(index);
                then.status(200).json_body(json!({ "acknowledged": true }));
            })
            .await;
        creates.push(mock);
    }
    let version = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/cord_version/_doc/current")
                .json_body(json!({ "version": "2021-05-03" }));
            then.status(201);
        })
        .await;
    let bulk = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/_bulk")
                .body_contains(r#""_id":"ug7v899j""#)
                .body_contains("COVID-19 emerged in Wuhan.\\nPatients were admitted.")
                .body_contains(r#""_id":"ug7v899j-0""#)
                .body_contains("We describe COVID-19 cases.");
            then.status(200).json_body(json!({ "took": 2, "errors": false, "items": [] }));
        })
        .await;

    let config = config(&server, &data_dir, false);
    let options = config.indexing_options(false).expect("options");
    let elastic = ElasticService::new(&config).expect("client");
    elastic
        .ensure_indexes(options.abstract_mode)
        .await
        .expect("indexes");

    let summary = IndexingService::new(elastic, options)
        .run()
        .await
        .expect("run");

    assert_eq!(heads.hits_async().await, 3);
    for create in &creates {
        create.assert_async().await;
    }
    version.assert_async().await;
    bulk.assert_async().await;

    let metrics = summary.metrics;
    assert_eq!(metrics.rows_read, 3);
    assert_eq!(metrics.groups, 2);
    assert_eq!(metrics.duplicate_rows, 1);
    assert_eq!(metrics.papers, 1);
    assert_eq!(metrics.paragraphs, 1);
    assert_eq!(metrics.abstracts, 1);
    assert_eq!(metrics.flushes, 1);
    assert_eq!(summary.version.map(|v| v.to_string()).as_deref(), Some("2021-05-03"));
}

#[tokio::test]
async fn inclusive_mode_skips_the_abstracts_index() {
    let server = MockServer::start_async().await;
    let (_root, data_dir) = corpus();

    server
        .mock_async(|when, then| {
            when.method(HEAD);
            then.status(200);
        })
        .await;
    let abstracts_head = server
        .mock_async(|when, then| {
            when.method(HEAD).path("/abstracts");
            then.status(200);
        })
        .await;

    let config = config(&server, &data_dir, true);
    let options = config.indexing_options(false).expect("options");
    ElasticService::new(&config)
        .expect("client")
        .ensure_indexes(options.abstract_mode)
        .await
        .expect("indexes");

    assert_eq!(abstracts_head.hits_async().await, 0);
}

#[tokio::test]
async fn rejected_bulk_write_fails_the_run() {
    let server = MockServer::start_async().await;
    let (_root, data_dir) = corpus();

    server
        .mock_async(|when, then| {
            when.method(PUT).path("/cord_version/_doc/current");
            then.status(201);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/_bulk");
            then.status(200).json_body(json!({
                "errors": true,
                "items": [{ "index": { "status": 429,
                    "error": { "reason": "rejected execution" } } }]
            }));
        })
        .await;

    let config = config(&server, &data_dir, false);
    let options = config.indexing_options(false).expect("options");
    let elastic = ElasticService::new(&config).expect("client");

    let err = IndexingService::new(elastic, options)
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, IndexingError::Sink(SinkError::Backend(_))));
    assert!(err.to_string().contains("rejected execution"));
}
