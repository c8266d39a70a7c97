use httpmock::prelude::*;
use metanetx_post::adapters::http::build_client;
use metanetx_post::utils::error::EtlError;
use metanetx_post::{
    BiggClient, BiggReactionNamePipeline, EtlEngine, KeggClient, KeggReactionNamePipeline,
    LocalStorage, SqliteStore,
};
use std::collections::BTreeMap;
use std::time::Duration;
use tempfile::TempDir;

async fn memory_store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
    store.migrate().await.unwrap();
    store
}

fn bigg_client(server: &MockServer) -> BiggClient {
    BiggClient::new(build_client(Duration::from_secs(5)).unwrap(), server.base_url())
}

fn kegg_client(server: &MockServer) -> KeggClient {
    KeggClient::new(build_client(Duration::from_secs(5)).unwrap(), server.base_url())
}

fn universal_reactions() -> serde_json::Value {
    serde_json::json!({
        "results_count": 3,
        "results": [
            {"bigg_id": "PGI", "name": "Glucose-6-phosphate isomerase", "model_bigg_id": "Universal"},
            {"bigg_id": "PFK", "name": "Phosphofructokinase", "model_bigg_id": "Universal"},
            {"bigg_id": "ATPM", "name": "", "model_bigg_id": "Universal"}
        ]
    })
}

#[tokio::test]
async fn test_bigg_names_are_loaded_for_annotated_reactions() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/universal/reactions");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(universal_reactions());
    });

    let store = memory_store().await;
    let bigg = store.insert_namespace("bigg.reaction", Some("BiGG")).await.unwrap();
    let pgi = store.insert_reaction("MNXR102535").await.unwrap();
    let atpm = store.insert_reaction("MNXR96131").await.unwrap();
    let unknown = store.insert_reaction("MNXR00001").await.unwrap();
    store.insert_reaction_annotation(pgi, bigg, "PGI").await.unwrap();
    store.insert_reaction_annotation(atpm, bigg, "ATPM").await.unwrap();
    store.insert_reaction_annotation(unknown, bigg, "NOT_IN_BIGG").await.unwrap();

    let pipeline = BiggReactionNamePipeline::new(bigg_client(&server), store.clone(), 2);
    let engine = EtlEngine::new_with_monitoring(pipeline, false);
    let summary = engine.run().await.unwrap();

    api_mock.assert();
    assert_eq!(summary.pipeline, "BiGG Reaction");
    assert_eq!(summary.transformed, 2);
    assert_eq!(summary.loaded, 1);
    assert_eq!(summary.skipped, 2);

    assert_eq!(
        store.reaction_names(pgi).await.unwrap(),
        vec!["Glucose-6-phosphate isomerase".to_string()]
    );
    assert!(store.reaction_names(atpm).await.unwrap().is_empty());
    assert!(store.reaction_names(unknown).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_collect_bigg_names_writes_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/universal/reactions");
        then.status(200).json_body(universal_reactions());
    });

    let pipeline = BiggReactionNamePipeline::without_store(bigg_client(&server));
    let storage = LocalStorage::new(temp_dir.path());
    pipeline.dump(&storage, "bigg_reaction_names.json").await.unwrap();

    let written = std::fs::read(temp_dir.path().join("bigg_reaction_names.json")).unwrap();
    let id2name: BTreeMap<String, String> = serde_json::from_slice(&written).unwrap();
    assert_eq!(id2name.len(), 2);
    assert_eq!(id2name["PFK"], "Phosphofructokinase");
    assert!(!id2name.contains_key("ATPM"));
}

#[tokio::test]
async fn test_bigg_count_mismatch_aborts_before_loading() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/universal/reactions");
        then.status(200).json_body(serde_json::json!({
            "results_count": 5,
            "results": [{"bigg_id": "PGI", "name": "Glucose-6-phosphate isomerase"}]
        }));
    });

    let store = memory_store().await;
    let bigg = store.insert_namespace("bigg.reaction", None).await.unwrap();
    let pgi = store.insert_reaction("MNXR102535").await.unwrap();
    store.insert_reaction_annotation(pgi, bigg, "PGI").await.unwrap();

    let pipeline = BiggReactionNamePipeline::new(bigg_client(&server), store.clone(), 100);
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, EtlError::InconsistentResponse { .. }));
    assert!(store.reaction_names(pgi).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_kegg_names_for_listed_reactions() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/list/reaction");
        then.status(200).body(
            "R00010\talpha,alpha-trehalose glucohydrolase; alpha,alpha-Trehalose + H2O <=> 2 D-Glucose\n\
             R00200\tATP:pyruvate 2-O-phosphotransferase\n",
        );
    });
    let trehalase = server.mock(|when, then| {
        when.method(GET).path("/get/R00010");
        then.status(200).body(
            "ENTRY       R00010                      Reaction\n\
             NAME        alpha,alpha-trehalose glucohydrolase;\n\
             \x20           alpha,alpha-trehalase\n\
             DEFINITION  alpha,alpha-Trehalose + H2O <=> 2 D-Glucose\n\
             ///\n",
        );
    });
    let kinase = server.mock(|when, then| {
        when.method(GET).path("/get/R00200");
        then.status(200).body(
            "ENTRY       R00200                      Reaction\n\
             NAME        ATP:pyruvate 2-O-phosphotransferase;pyruvate kinase;\n\
             ///\n",
        );
    });

    let store = memory_store().await;
    let kegg = store.insert_namespace("kegg.reaction", Some("KEGG")).await.unwrap();
    let first = store.insert_reaction("MNXR1").await.unwrap();
    let second = store.insert_reaction("MNXR2").await.unwrap();
    let retired = store.insert_reaction("MNXR3").await.unwrap();
    store.insert_reaction_annotation(first, kegg, "R00010").await.unwrap();
    store.insert_reaction_annotation(second, kegg, "R00200").await.unwrap();
    store.insert_reaction_annotation(retired, kegg, "R99999").await.unwrap();

    let pipeline = KeggReactionNamePipeline::new(kegg_client(&server), store.clone(), 1, 2);
    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    trehalase.assert();
    kinase.assert();
    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.loaded, 4);
    assert_eq!(summary.skipped, 1);

    assert_eq!(
        store.reaction_names(first).await.unwrap(),
        vec![
            "alpha,alpha-trehalase".to_string(),
            "alpha,alpha-trehalose glucohydrolase".to_string()
        ]
    );
    assert_eq!(
        store.reaction_names(second).await.unwrap(),
        vec![
            "ATP:pyruvate 2-O-phosphotransferase".to_string(),
            "pyruvate kinase".to_string()
        ]
    );
    assert!(store.reaction_names(retired).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_kegg_entry_failures_are_skipped() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/list/reaction");
        then.status(200).body("rn:R00001\tpolyphosphate polyphosphohydrolase\nrn:R00002\tx\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/get/R00001");
        then.status(200)
            .body("ENTRY       R00001\nNAME        polyphosphate polyphosphohydrolase\n///\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/get/R00002");
        then.status(503);
    });

    let store = memory_store().await;
    let kegg = store.insert_namespace("kegg.reaction", None).await.unwrap();
    let ok = store.insert_reaction("MNXR1").await.unwrap();
    let unavailable = store.insert_reaction("MNXR2").await.unwrap();
    store.insert_reaction_annotation(ok, kegg, "R00001").await.unwrap();
    store.insert_reaction_annotation(unavailable, kegg, "R00002").await.unwrap();

    let pipeline = KeggReactionNamePipeline::new(kegg_client(&server), store.clone(), 10, 4);
    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.loaded, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        store.reaction_names(ok).await.unwrap(),
        vec!["polyphosphate polyphosphohydrolase".to_string()]
    );
}

#[tokio::test]
async fn test_kegg_entry_with_two_name_lines_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/list/reaction");
        then.status(200).body("R00001\tx\n");
    });
    server.mock(|when, then| {
        when.method(GET).path("/get/R00001");
        then.status(200)
            .body("ENTRY       R00001\nNAME        first\nNAME        second\n///\n");
    });

    let store = memory_store().await;
    let kegg = store.insert_namespace("kegg.reaction", None).await.unwrap();
    let reaction = store.insert_reaction("MNXR1").await.unwrap();
    store.insert_reaction_annotation(reaction, kegg, "R00001").await.unwrap();

    let pipeline = KeggReactionNamePipeline::new(kegg_client(&server), store.clone(), 10, 1);
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, EtlError::Parse { .. }));
    assert!(store.reaction_names(reaction).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_namespace_is_reported() {
    let server = MockServer::start();
    let store = memory_store().await;

    let pipeline = KeggReactionNamePipeline::new(kegg_client(&server), store, 10, 1);
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, EtlError::NotFound { .. }));
}

#[tokio::test]
async fn test_failed_batch_keeps_earlier_batches() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/universal/reactions");
        then.status(200).json_body(serde_json::json!({
            "results_count": 4,
            "results": [
                {"bigg_id": "PGI", "name": "Glucose-6-phosphate isomerase"},
                {"bigg_id": "FBA", "name": "Fructose-bisphosphate aldolase"},
                {"bigg_id": "TPI", "name": "Triose-phosphate isomerase"},
                {"bigg_id": "PFK", "name": "Phosphofructokinase"}
            ]
        }));
    });

    let store = memory_store().await;
    let bigg = store.insert_namespace("bigg.reaction", None).await.unwrap();
    let mut reactions = Vec::new();
    for identifier in ["PGI", "FBA", "TPI", "PFK"] {
        let reaction = store.insert_reaction(&format!("MNXR_{}", identifier)).await.unwrap();
        store.insert_reaction_annotation(reaction, bigg, identifier).await.unwrap();
        reactions.push(reaction);
    }
    sqlx::query(
        "CREATE TRIGGER reject_pfk BEFORE INSERT ON reaction_name
         WHEN NEW.name = 'Phosphofructokinase'
         BEGIN SELECT RAISE(ABORT, 'rejected'); END",
    )
    .execute(store.pool())
    .await
    .unwrap();

    let pipeline = BiggReactionNamePipeline::new(bigg_client(&server), store.clone(), 2);
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, EtlError::DatabaseError(_)));

    // 第一批已提交，第二批整批回滾
    assert_eq!(
        store.reaction_names(reactions[0]).await.unwrap(),
        vec!["Glucose-6-phosphate isomerase".to_string()]
    );
    assert_eq!(
        store.reaction_names(reactions[1]).await.unwrap(),
        vec!["Fructose-bisphosphate aldolase".to_string()]
    );
    assert!(store.reaction_names(reactions[2]).await.unwrap().is_empty());
    assert!(store.reaction_names(reactions[3]).await.unwrap().is_empty());
}
