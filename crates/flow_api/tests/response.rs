use serde_json::{json, Value};

use flow_api::parse_response;

#[test]
fn flow_message_text_and_blocks_are_returned_together() {
    let document = json!({
        "session_id": "s1",
        "outputs": [{"outputs": [{"results": {"message": {
            "text": "42",
            "data": {
                "text": "42",
                "content_blocks": [{
                    "title": "Agent Steps",
                    "contents": [{"type": "tool_use", "name": "calc", "tool_input": {"a": 1}, "output": 2}]
                }]
            }
        }}}]}]
    });

    let result = parse_response(&document);
    assert_eq!(result.text, "42");
    assert!(result.has_blocks());
    let blocks = result.content_blocks.expect("blocks");
    assert_eq!(blocks[0].tool_invocations().count(), 1);
    assert_eq!(result.raw["text"], "42");
}

#[test]
fn message_blocks_fall_back_to_the_message_object() {
    let document = json!({
        "outputs": [{"outputs": [{"results": {"message": {
            "data": {"text": "nested"},
            "content_blocks": [{"title": "Steps", "contents": []}]
        }}}]}]
    });

    let result = parse_response(&document);
    assert_eq!(result.text, "nested");
    assert_eq!(result.content_blocks.expect("blocks")[0].title, "Steps");
}

#[test]
fn artifacts_and_outer_fields_are_used_in_order() {
    let artifacts = json!({"outputs": [{"outputs": [{"artifacts": {"message": "art"}, "text": "t"}]}]});
    assert_eq!(parse_response(&artifacts).text, "art");

    let first_text = json!({"outputs": [{"outputs": [{"text": "t"}]}]});
    assert_eq!(parse_response(&first_text).text, "t");

    let outer = json!({"outputs": [{"message": "outer"}]});
    assert_eq!(parse_response(&outer).text, "outer");
}

#[test]
fn top_level_fields_are_read_when_no_outputs_match() {
    assert_eq!(parse_response(&json!({"result": "r", "text": "t"})).text, "r");
    assert_eq!(parse_response(&json!({"message": "m"})).text, "m");
    assert_eq!(parse_response(&json!({"text": "t"})).text, "t");
}

#[test]
fn unrecognised_documents_render_as_fenced_json() {
    let result = parse_response(&json!({"unexpected": [1, 2]}));
    assert!(result.text.starts_with("```json\n"));
    assert!(result.text.contains("\"unexpected\""));
    assert!(result.content_blocks.is_none());
}

#[test]
fn parse_response_never_fails_on_odd_input() {
    let mut deep = json!("leaf");
    for _ in 0..64 {
        deep = json!({"outputs": [deep], "self": {"outputs": "not an array"}});
    }

    for document in [Value::Null, json!({}), json!([]), json!(3), deep] {
        let result = parse_response(&document);
        assert!(!result.text.is_empty(), "empty text for {document}");
    }
}

#[test]
fn whitespace_text_is_kept_like_streamed_frames() {
    let document = json!({"result": "\n"});
    assert_eq!(parse_response(&document).text, "\n");
    assert_eq!(flow_api::frame::extract_text(&json!({"token": "\n"})), "\n");
}
