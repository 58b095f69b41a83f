use serde_json::json;

use flow_api::{
    build_content_blocks_from_tools, AssistantTurn, ChatRole, ContentBlock, FinalResult,
    StreamChunk, ToolInvocation,
};

fn text_chunk(text: &str, replace: bool) -> StreamChunk {
    StreamChunk::Structured {
        text: Some(text.to_owned()),
        replace,
        tools: Vec::new(),
        content_blocks: Vec::new(),
    }
}

fn calc_tool() -> ToolInvocation {
    ToolInvocation {
        name: "calc".to_owned(),
        input: json!({"a": 1}),
        output: json!(2),
    }
}

#[test]
fn echoed_prompt_is_ignored() {
    let mut turn = AssistantTurn::new("What is 1+1?");
    assert!(!turn.apply(&text_chunk("  What is 1+1? ", true)));
    assert!(!turn.apply(&StreamChunk::Raw("What is 1+1?".to_owned())));
    assert_eq!(turn.text(), "");
    assert!(turn.is_typing());
}

#[test]
fn replace_chunks_overwrite_and_deltas_append() {
    let mut turn = AssistantTurn::new("q");
    turn.apply(&text_chunk("Hel", false));
    turn.apply(&text_chunk("lo", false));
    assert_eq!(turn.text(), "Hello");

    turn.apply(&text_chunk("Hello there", true));
    assert_eq!(turn.text(), "Hello there");

    turn.apply(&StreamChunk::Raw("raw snapshot".to_owned()));
    assert_eq!(turn.text(), "raw snapshot");
    assert!(!turn.is_typing());
}

#[test]
fn tools_without_blocks_synthesize_agent_steps() {
    let mut turn = AssistantTurn::new("q");
    turn.apply(&StreamChunk::Structured {
        text: None,
        replace: false,
        tools: vec![calc_tool()],
        content_blocks: Vec::new(),
    });

    let expected = build_content_blocks_from_tools(&[calc_tool()]).expect("blocks");
    assert_eq!(turn.content_blocks(), Some(expected.as_slice()));
    assert!(turn.is_typing());
}

#[test]
fn final_result_only_overrides_with_non_empty_values() {
    let mut turn = AssistantTurn::new("q");
    turn.apply(&StreamChunk::Structured {
        text: Some("streamed".to_owned()),
        replace: true,
        tools: vec![calc_tool()],
        content_blocks: vec![ContentBlock::new("Steps", Vec::new())],
    });

    turn.finish(&FinalResult::stream_end());
    assert_eq!(turn.text(), "streamed");
    assert_eq!(turn.content_blocks().map(|blocks| blocks[0].title.as_str()), Some("Steps"));
    assert!(!turn.is_typing());

    turn.finish(&FinalResult {
        text: "final".to_owned(),
        content_blocks: Some(Vec::new()),
        raw: json!(null),
    });
    assert_eq!(turn.text(), "final");
    assert_eq!(turn.content_blocks().map(<[ContentBlock]>::len), Some(1));

    let message = turn.into_message(4);
    assert_eq!(message.id, 4);
    assert_eq!(message.role, ChatRole::Assistant);
    assert_eq!(message.content, "final");
}
