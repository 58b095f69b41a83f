use flow_api::{AssistantTurn, SseStreamParser, StreamChunk};

fn texts(chunks: &[StreamChunk]) -> Vec<&str> {
    chunks.iter().filter_map(StreamChunk::text).collect()
}

#[test]
fn frame_split_at_any_offset_yields_one_chunk() {
    let payload = "data: {\"text\":\"ab\"}\n\n".as_bytes();
    let whole = SseStreamParser::parse_frames("data: {\"text\":\"ab\"}\n\n");
    assert_eq!(texts(&whole), vec!["ab"]);

    for split in 1..payload.len() {
        let mut parser = SseStreamParser::default();
        let mut chunks = parser.feed(&payload[..split]);
        chunks.extend(parser.feed(&payload[split..]));

        assert_eq!(chunks, whole, "split at byte {split}");
        assert!(parser.is_empty_buffer());
    }
}

#[test]
fn multibyte_text_split_inside_a_character_is_preserved() {
    let payload = "data: {\"token\":\"สวัสดี\"}\n\n".as_bytes();
    let mut parser = SseStreamParser::default();
    let mut chunks = parser.feed(&payload[..17]);
    chunks.extend(parser.feed(&payload[17..]));

    assert_eq!(texts(&chunks), vec!["สวัสดี"]);
}

#[test]
fn crlf_event_boundaries_are_recognised() {
    let chunks = SseStreamParser::parse_frames("data: {\"token\":\"a\"}\r\n\r\ndata: {\"token\":\"b\"}\r\n\r\n");
    assert_eq!(texts(&chunks), vec!["a", "b"]);
}

#[test]
fn end_event_stops_reading_and_drops_the_remainder() {
    let mut parser = SseStreamParser::default();
    let chunks = parser.feed(
        concat!(
            "data: {\"token\":\"a\"}\n\n",
            "data: {\"event\":\"end\",\"data\":{}}\n\n",
            "data: {\"token\":\"late\"}\n\n",
            "data: {\"tok"
        )
        .as_bytes(),
    );

    assert_eq!(texts(&chunks), vec!["a"]);
    assert!(parser.is_done());
    assert!(parser.is_empty_buffer());
    assert!(parser.feed(b"data: {\"token\":\"after\"}\n\n").is_empty());
}

#[test]
fn done_sentinel_terminates_without_a_chunk() {
    let chunks = SseStreamParser::parse_frames("data: [DONE]\n\ndata: {\"token\":\"x\"}\n\n");
    assert!(chunks.is_empty());
}

#[test]
fn non_json_payloads_are_emitted_raw() {
    let chunks = SseStreamParser::parse_frames("data: hello there \n\n");
    assert_eq!(chunks, vec![StreamChunk::Raw("hello there".to_owned())]);
}

#[test]
fn events_without_data_lines_use_the_raw_event() {
    let chunks = SseStreamParser::parse_frames("{\"token\":\"ndjson\"}\n\n");
    assert_eq!(texts(&chunks), vec!["ndjson"]);
}

#[test]
fn snapshot_events_replace_instead_of_appending() {
    let chunks = SseStreamParser::parse_frames(concat!(
        "event: add_message\n",
        "data: {\"event\":\"add_message\",\"data\":{\"sender\":\"Machine\",\"text\":\"a\"}}\n\n",
        "event: add_message\n",
        "data: {\"event\":\"add_message\",\"data\":{\"sender\":\"Machine\",\"text\":\"ab\"}}\n\n"
    ));

    assert_eq!(chunks.len(), 2);
    assert!(chunks.iter().all(StreamChunk::is_replace));

    let mut turn = AssistantTurn::new("question");
    for chunk in &chunks {
        turn.apply(chunk);
    }
    assert_eq!(turn.text(), "ab");
}

#[test]
fn tool_only_frames_are_emitted_without_text() {
    let chunks = SseStreamParser::parse_frames(concat!(
        "data: {\"event\":\"add_message\",\"data\":{\"text\":\"\",\"content_blocks\":[",
        "{\"title\":\"Agent Steps\",\"contents\":[{\"type\":\"tool_use\",\"name\":\"calc\",\"tool_input\":{},\"output\":1}]}",
        "]}}\n\n"
    ));

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text(), None);
    assert!(!chunks[0].is_replace());
    assert_eq!(chunks[0].tools()[0].name, "calc");
    assert_eq!(chunks[0].content_blocks().len(), 1);
}
