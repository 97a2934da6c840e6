use colloquy::{
    BoundingBoxConfig, ConversationIndex, DepthSortKey, Pipeline, PipelineConfig, PipelineError,
    SpeakerRegistry,
};
use futures::executor::block_on;
use futures::io::Cursor;
use serde_json::json;

const SPEAKERS: &str = r#"{
  "A": {"meta": {"character_name": "ALICE SMITH", "movie_idx": "m12"}},
  "B": {"meta": {"character_name": "bob", "movie_idx": "m12"}},
  "C": {"meta": {"character_name": "CAROL", "movie_idx": "m13"}},
  "D": {"meta": {"character_name": "DAVE", "movie_idx": "m0"}}
}"#;

const INDEX: &str = r#"{"m0": {"movie_name": "zero"}, "m12": {"movie_name": "twelve"}, "m13": {"movie_name": "thirteen"}}"#;

const SCENARIO: &str = r#"{"id": "u1", "speaker": "A", "reply-to": null, "text": "Hello?", "meta": {"movie_id": "m12"}}
{"id": "u2", "speaker": "B", "reply-to": "u1", "text": "Hi.", "meta": {"movie_id": "m12"}}
"#;

fn registry() -> SpeakerRegistry {
    SpeakerRegistry::from_json_str(SPEAKERS).unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig::default()).unwrap()
}

#[test]
fn reply_pair_end_to_end() {
    let dataset = pipeline().run_sync(&registry(), None, SCENARIO).unwrap();

    assert_eq!(
        dataset.nodes.iter().map(|n| n.id()).collect::<Vec<_>>(),
        vec!["A", "B"]
    );
    let a = dataset.node("A").unwrap();
    let b = dataset.node("B").unwrap();
    assert_eq!((a.depth, b.depth), (0, 1));
    assert_eq!((a.x, a.y), (0.0, 0.0));
    // Ring step = 1.75 * node diameter (2 * 0.3).
    assert!(((b.x - a.x).hypot(b.y - a.y) - 1.05).abs() < 1e-9);
    assert_eq!(a.radius, 0.3);
    assert_eq!(a.label, "Alice Smith");
    assert_eq!(b.label, "Bob");

    assert_eq!(dataset.edges.len(), 1);
    let e = &dataset.edges[0];
    assert_eq!((e.id.as_str(), e.source.as_str(), e.target.as_str()), ("u2", "B", "A"));
    assert!(dataset.diagnostics.is_empty());
}

#[test]
fn dataset_serializes_flat_nodes_and_edges() {
    let dataset = pipeline().run_sync(&registry(), None, SCENARIO).unwrap();
    let value = serde_json::to_value(&dataset).unwrap();

    assert_eq!(
        value["nodes"][0],
        json!({
            "id": "A",
            "character_name": "ALICE SMITH",
            "movie_idx": "m12",
            "label": "Alice Smith",
            "x": 0.0,
            "y": 0.0,
            "depth": 0,
            "point": "A",
            "radius": 0.3,
        })
    );
    assert_eq!(value["edges"][0]["replyToSpeaker"], json!("A"));
    assert_eq!(value["edges"][0]["replyToText"], json!("Hello?"));
    assert!(value.get("diagnostics").is_none());
}

#[test]
fn computed_fields_win_over_same_named_metadata() {
    let registry = SpeakerRegistry::from_json_str(
        r#"{"A": {"meta": {"character_name": "ALICE", "label": "stale", "x": 99, "radius": 7}},
            "B": {"meta": {"character_name": "BOB", "depth": "deep", "gender": "m"}}}"#,
    )
    .unwrap();
    let dataset = pipeline().run_sync(&registry, None, SCENARIO).unwrap();
    let text = serde_json::to_string(&dataset).unwrap();

    for key in ["\"label\"", "\"x\"", "\"radius\"", "\"depth\""] {
        assert_eq!(text.matches(key).count(), 2, "{key} in {text}");
    }
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["nodes"][0]["label"], json!("Alice"));
    assert_eq!(value["nodes"][0]["x"], json!(0.0));
    assert_eq!(value["nodes"][0]["radius"], json!(0.3));
    assert_eq!(value["nodes"][1]["depth"], json!(1));
    assert_eq!(value["nodes"][1]["gender"], json!("m"));
}

#[test]
fn replies_into_excluded_conversations_are_skipped() {
    let text = format!(
        "{SCENARIO}{}\n{}\n",
        r#"{"id": "u3", "speaker": "C", "reply-to": "u99", "text": "Who?", "meta": {"movie_id": "m13"}}"#,
        r#"{"id": "u99", "speaker": "D", "reply-to": null, "text": "Me.", "meta": {"movie_id": "m0"}}"#,
    );
    let dataset = pipeline().run_sync(&registry(), None, &text).unwrap();

    assert!(dataset.node("C").is_some());
    assert!(dataset.node("D").is_none());
    assert_eq!(
        dataset.edges.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
        vec!["u2"]
    );
    assert_eq!(dataset.diagnostics.len(), 1);
}

#[test]
fn async_run_matches_sync_run() {
    let index = ConversationIndex::from_json_str(INDEX).unwrap();
    let sync = pipeline().run_sync(&registry(), Some(&index), SCENARIO).unwrap();
    let streamed = block_on(pipeline().run(
        &registry(),
        Some(&index),
        Cursor::new(SCENARIO.as_bytes().to_vec()),
    ))
    .unwrap();
    assert_eq!(sync, streamed);
}

#[test]
fn repeated_runs_are_identical() {
    let config = PipelineConfig {
        layout: colloquy::LayoutConfig {
            bounding_box: Some(BoundingBoxConfig {
                x1: 0.0,
                y1: 0.0,
                w: 1024.0,
                h: 768.0,
            }),
            depth_sort: Some(DepthSortKey::Degree),
            ..Default::default()
        },
        ..Default::default()
    };
    let p = Pipeline::new(config).unwrap();
    let first = serde_json::to_string(&p.run_sync(&registry(), None, SCENARIO).unwrap()).unwrap();
    let second = serde_json::to_string(&p.run_sync(&registry(), None, SCENARIO).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn degree_sort_puts_busy_speakers_first_on_a_ring() {
    // Hub A; B and C on ring 1, C replies more often.
    let text = r#"{"id": "u1", "speaker": "A", "text": "a", "meta": {"movie_id": "m12"}}
{"id": "u2", "speaker": "B", "reply-to": "u1", "text": "b", "meta": {"movie_id": "m12"}}
{"id": "u3", "speaker": "C", "reply-to": "u1", "text": "c", "meta": {"movie_id": "m12"}}
{"id": "u4", "speaker": "C", "reply-to": "u1", "text": "c", "meta": {"movie_id": "m12"}}
{"id": "u5", "speaker": "A", "reply-to": "u2", "text": "a", "meta": {"movie_id": "m12"}}
{"id": "u6", "speaker": "A", "reply-to": "u3", "text": "a", "meta": {"movie_id": "m12"}}"#;

    let natural = pipeline().run_sync(&registry(), None, text).unwrap();
    let b = natural.node("B").unwrap();
    assert!(b.x > 0.0 && b.y.abs() < 1e-12);

    let mut config = PipelineConfig::default();
    config.layout.depth_sort = Some(DepthSortKey::Degree);
    let sorted = Pipeline::new(config)
        .unwrap()
        .run_sync(&registry(), None, text)
        .unwrap();
    let c = sorted.node("C").unwrap();
    assert_eq!(c.depth, 1);
    assert!(c.x > 0.0 && c.y.abs() < 1e-12);
}

#[test]
fn unknown_speaker_aborts_the_run() {
    let text = r#"{"id": "u1", "speaker": "Z", "text": "?", "meta": {"movie_id": "m12"}}"#;
    let err = pipeline().run_sync(&registry(), None, text).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Core(colloquy::Error::MissingSpeaker { ref speaker_id }) if speaker_id == "Z"
    ));
}

#[test]
fn malformed_stream_aborts_the_run() {
    let err = pipeline()
        .run_sync(&registry(), None, "{\"id\": \"u1\"\nnot json\n")
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Core(colloquy::Error::Parse { line: 1, .. })
    ));
}

#[test]
fn empty_selection_is_an_empty_dataset() {
    let config = PipelineConfig {
        movies: vec!["m404".to_string()],
        ..Default::default()
    };
    let index = ConversationIndex::from_json_str(INDEX).unwrap();
    let dataset = Pipeline::new(config)
        .unwrap()
        .run_sync(&registry(), Some(&index), SCENARIO)
        .unwrap();
    assert!(dataset.nodes.is_empty());
    assert!(dataset.edges.is_empty());
}

#[test]
fn empty_movie_list_is_an_empty_dataset() {
    let config = PipelineConfig {
        movies: Vec::new(),
        ..Default::default()
    };
    assert!(config.filter_set().is_empty());
    let dataset = Pipeline::new(config)
        .unwrap()
        .run_sync(&registry(), None, SCENARIO)
        .unwrap();
    assert!(dataset.nodes.is_empty());
    assert!(dataset.edges.is_empty());
}

#[test]
fn explicit_roots_are_honored() {
    let mut config = PipelineConfig::default();
    config.layout.roots = Some(vec!["B".to_string()]);
    let dataset = Pipeline::new(config)
        .unwrap()
        .run_sync(&registry(), None, SCENARIO)
        .unwrap();
    assert_eq!(dataset.node("B").unwrap().depth, 0);
    assert_eq!(dataset.node("A").unwrap().depth, 1);
}

#[test]
fn unknown_root_is_a_layout_error() {
    let mut config = PipelineConfig::default();
    config.layout.roots = Some(vec!["nobody".to_string()]);
    let err = Pipeline::new(config)
        .unwrap()
        .run_sync(&registry(), None, SCENARIO)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Layout(nautilus::Error::UnknownRoot { .. })));
}
