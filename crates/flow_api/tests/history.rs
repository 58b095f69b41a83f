use serde_json::json;

use flow_api::history::{flatten_pairs, pair_records, summarize_sessions};
use flow_api::{
    build_content_blocks_from_tools, new_session_id, ChatRole, HistoryPair, ToolInvocation,
};

const NOW: i64 = 1_800_000_000_000;

fn pair(session_id: &str, input: &str, timestamp_ms: Option<i64>) -> HistoryPair {
    HistoryPair {
        input: input.to_owned(),
        output: format!("answer to {input}"),
        session_id: session_id.to_owned(),
        timestamp_ms,
        ..HistoryPair::default()
    }
}

#[test]
fn trailing_unpaired_record_is_dropped() {
    let records = json!([
        {"sender": "User", "text": "hi", "session_id": "s1"},
        {"sender": "AI", "text": "hello", "session_id": "s1"},
        {"sender": "User", "text": "bye", "session_id": "s1"}
    ]);

    let pairs = pair_records(&records);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].input, "hi");
    assert_eq!(pairs[0].output, "hello");
    assert_eq!(pairs[0].session_id, "s1");
}

#[test]
fn misaligned_pairs_are_skipped_not_realigned() {
    let records = json!([
        {"sender": "User", "text": "one"},
        {"sender": "User", "text": "retry"},
        {"sender": "Machine", "text": "late answer"},
        {"sender": "User", "text": "two"},
        {"sender": "User", "text": "three"},
        {"sender": "Machine", "text": "answer three"}
    ]);

    let pairs = pair_records(&records);
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].input, "three");
    assert_eq!(pairs[0].output, "answer three");
}

#[test]
fn non_array_history_yields_no_pairs() {
    assert!(pair_records(&json!({"detail": "nope"})).is_empty());
}

#[test]
fn pairs_carry_session_timestamp_and_tools() {
    let records = json!([
        {"sender": "User", "text": "add", "session_id": "", "timestamp": "2024-10-14 08:30:00 UTC"},
        {
            "sender": "Machine",
            "text": "2",
            "session_id": "s9",
            "timestamp": "2024-10-14T08:30:05Z",
            "content_blocks": [{
                "title": "Agent Steps",
                "contents": [{"type": "tool_use", "name": "calc", "tool_input": {"a": 1}, "output": 2}]
            }]
        }
    ]);

    let pairs = pair_records(&records);
    assert_eq!(pairs[0].session_id, "s9");
    assert_eq!(pairs[0].timestamp_ms, Some(1_728_894_605_000));
    assert_eq!(
        pairs[0].tools,
        vec![ToolInvocation {
            name: "calc".to_owned(),
            input: json!({"a": 1}),
            output: json!(2),
        }]
    );
    assert_eq!(pairs[0].content_blocks.as_ref().map(Vec::len), Some(1));
}

#[test]
fn session_summary_reflects_the_most_recent_pair() {
    let pairs = vec![
        pair("s1", "newer question", Some(2_000)),
        pair("s2", "other", Some(1_500)),
        pair("s1", "older question", Some(1_000)),
    ];

    let sessions = summarize_sessions(&pairs, 50, NOW);
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].session_id, "s1");
    assert_eq!(sessions[0].preview, "newer question");
    assert_eq!(sessions[0].title, "newer question");
    assert_eq!(sessions[0].timestamp_ms, 2_000);
    assert_eq!(sessions[1].session_id, "s2");
}

#[test]
fn session_summaries_sort_truncate_and_default() {
    let long_input = "x".repeat(100);
    let pairs = vec![
        pair("", "no session", Some(9_000)),
        pair("old", "old", Some(1)),
        pair("undated", &long_input, None),
        HistoryPair {
            session_id: "quiet".to_owned(),
            timestamp_ms: Some(5),
            ..HistoryPair::default()
        },
    ];

    let sessions = summarize_sessions(&pairs, 2, NOW);
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].session_id, "undated");
    assert_eq!(sessions[0].timestamp_ms, NOW);
    assert_eq!(sessions[0].title.chars().count(), 24);
    assert_eq!(sessions[0].preview.chars().count(), 80);
    assert_eq!(sessions[1].session_id, "quiet");
    assert_eq!(sessions[1].title, "Chat");
    assert_eq!(sessions[1].preview, "");
}

#[test]
fn equal_timestamps_keep_the_later_pair() {
    let pairs = vec![pair("s1", "first", Some(10)), pair("s1", "second", Some(10))];
    let sessions = summarize_sessions(&pairs, 10, NOW);
    assert_eq!(sessions[0].preview, "second");
}

#[test]
fn flattened_pairs_rebuild_blocks_from_tools() {
    let tools = vec![ToolInvocation {
        name: "calc".to_owned(),
        input: json!({"a": 1}),
        output: json!(2),
    }];
    let pairs = vec![
        HistoryPair {
            tools: tools.clone(),
            ..pair("s1", "q", Some(7))
        },
        HistoryPair {
            output: String::new(),
            ..pair("s1", "unanswered", None)
        },
    ];

    let messages = flatten_pairs(&pairs, NOW);
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].role, ChatRole::User);
    assert_eq!(messages[1].role, ChatRole::Assistant);
    assert_eq!(messages[1].timestamp_ms, 7);
    assert_eq!(messages[1].content_blocks, build_content_blocks_from_tools(&tools));
    assert_eq!(messages[2].content, "unanswered");
    assert_eq!(messages[2].timestamp_ms, NOW);
    assert_eq!(
        messages.iter().map(|message| message.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn empty_tool_list_builds_no_blocks() {
    assert!(build_content_blocks_from_tools(&[]).is_none());
}

#[test]
fn new_session_ids_use_the_chat_prefix() {
    let id = new_session_id();
    let millis = id.strip_prefix("chat_").expect("chat_ prefix");
    assert!(millis.parse::<i64>().expect("numeric suffix") > 1_600_000_000_000);
}
