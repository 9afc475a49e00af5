use ollama_api::{ChatDoneReason, ChatStreamEvent, NdjsonStreamParser};

#[test]
fn ndjson_framing_parses_deltas_and_done() {
    let payload = concat!(
        "{\"message\":{\"role\":\"assistant\",\"content\":\"Great\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\" job\"},\"done\":false}\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"\"},\"done\":true,",
        "\"done_reason\":\"stop\",\"prompt_eval_count\":26,\"eval_count\":298}\n",
    );

    let events = NdjsonStreamParser::parse_lines(payload);
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        ChatStreamEvent::MessageDelta {
            content: "Great".to_string(),
        }
    );
    assert_eq!(
        events[1],
        ChatStreamEvent::MessageDelta {
            content: " job".to_string(),
        }
    );

    let ChatStreamEvent::Done(done) = &events[2] else {
        panic!("final event should be the done record");
    };
    assert_eq!(done.reason, Some(ChatDoneReason::Stop));
    assert_eq!(done.stats.prompt_eval_count, Some(26));
    assert_eq!(done.stats.eval_count, Some(298));
}

#[test]
fn ndjson_parser_maps_in_band_error_records() {
    let payload = "{\"error\":\"model \\\"mixtral\\\" not found\"}\n";

    let events = NdjsonStreamParser::parse_lines(payload);
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        ChatStreamEvent::StreamError { message } if message.contains("not found")
    ));
}

#[test]
fn ndjson_parser_surfaces_malformed_lines_verbatim() {
    let payload = concat!(
        "{broken-json\n",
        "{\"message\":{\"role\":\"assistant\",\"content\":\"x\"},\"done\":false}\n",
    );

    let events = NdjsonStreamParser::parse_lines(payload);
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        ChatStreamEvent::Malformed {
            line: "{broken-json".to_string(),
        }
    );
    assert!(matches!(events[1], ChatStreamEvent::MessageDelta { .. }));
}

#[test]
fn ndjson_parser_skips_blank_lines_and_bare_records() {
    let payload = "\n\n{\"model\":\"mixtral\",\"done\":false}\n";

    let events = NdjsonStreamParser::parse_lines(payload);
    assert!(events.is_empty());
}

#[test]
fn unknown_done_reason_maps_to_none() {
    let payload = "{\"done\":true,\"done_reason\":\"mystery\"}\n";

    let events = NdjsonStreamParser::parse_lines(payload);
    assert_eq!(events.len(), 1);
    let ChatStreamEvent::Done(done) = &events[0] else {
        panic!("done record expected");
    };
    assert_eq!(done.reason, None);
}
