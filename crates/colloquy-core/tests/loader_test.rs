use colloquy_core::{CorpusLoader, Error, FilterSet};
use futures::executor::block_on;
use futures::io::Cursor;

const STREAM: &str = r#"{"id": "L1", "speaker": "u1", "reply-to": null, "text": "Hi.", "meta": {"movie_id": "m12"}}
{"id": "L2", "speaker": "u2", "reply-to": "L1", "text": "Hello.", "meta": {"movie_id": "m12"}}

{"id": "L3", "speaker": "u3", "reply-to": null, "text": "Elsewhere.", "meta": {"movie_id": "m0"}}
{"id": "L4", "speaker": "u4", "reply-to": "L3", "text": "Still elsewhere.", "meta": {"movie_id": "m13"}}
{"id": "L5", "speaker": "u5", "reply-to": null, "text": "No movie."}
"#;

fn loader() -> CorpusLoader {
    CorpusLoader::new(FilterSet::new(["m13", "m12"]))
}

fn ids(set: &colloquy_core::UtteranceSet) -> Vec<&str> {
    set.iter().map(|u| u.id.as_str()).collect()
}

#[test]
fn keeps_selected_conversations_in_stream_order() {
    let set = loader().load_sync(STREAM).unwrap();
    assert_eq!(ids(&set), vec!["L1", "L2", "L4"]);
    assert_eq!(set.get("L2").unwrap().text, "Hello.");
    assert!(set.get("L3").is_none());
}

#[test]
fn async_and_sync_loading_agree() {
    let sync = loader().load_sync(STREAM).unwrap();
    let reader = Cursor::new(STREAM.as_bytes().to_vec());
    let streamed = block_on(loader().load(reader)).unwrap();
    assert_eq!(sync.as_slice(), streamed.as_slice());
}

#[test]
fn empty_filter_selects_nothing() {
    assert!(FilterSet::default().is_empty());
    assert!(!FilterSet::new(["m0"]).is_empty());
    let set = CorpusLoader::new(FilterSet::default())
        .load_sync(STREAM)
        .unwrap();
    assert!(set.is_empty());
}

#[test]
fn malformed_line_is_fatal_even_outside_the_filter() {
    let text = format!("{STREAM}{{\"id\": \"L6\", \"meta\": {{\"movie_id\": \"m0\"}}\n");
    let err = loader().load_sync(&text).unwrap_err();
    assert!(matches!(err, Error::Parse { line: 7, .. }), "{err}");

    let reader = Cursor::new(text.into_bytes());
    let err = block_on(loader().load(reader)).unwrap_err();
    assert!(matches!(err, Error::Parse { line: 7, .. }), "{err}");
}

#[test]
fn invalid_utf8_is_a_parse_error_with_its_line() {
    let mut bytes = br#"{"id": "L1", "speaker": "u1", "meta": {"movie_id": "m12"}}"#.to_vec();
    bytes.extend_from_slice(b"\n{\"id\": \"\xff\"}\n");
    let err = block_on(loader().load(Cursor::new(bytes))).unwrap_err();
    assert!(matches!(err, Error::Parse { line: 2, .. }), "{err}");
}

#[test]
fn crlf_streams_parse() {
    let text = STREAM.replace('\n', "\r\n");
    let set = block_on(loader().load(Cursor::new(text.into_bytes()))).unwrap();
    assert_eq!(ids(&set), vec!["L1", "L2", "L4"]);
}

#[test]
fn repeated_ids_resolve_to_the_later_record() {
    let text = r#"{"id": "L1", "speaker": "u1", "text": "first", "meta": {"movie_id": "m12"}}
{"id": "L1", "speaker": "u1", "text": "second", "meta": {"movie_id": "m12"}}"#;
    let set = loader().load_sync(text).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(set.get("L1").unwrap().text, "second");
}
