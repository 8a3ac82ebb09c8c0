use proptest::prelude::*;
use robolink_communication::{ResponseParser, ResponseStatus};
use robolink_core::{Chart, DeviceKind, NodeUpdate, Pose, StateItem};

#[test]
fn test_robot_line_batch() {
    let text = "base 0 0 0 0 0 0\nshoulder 0 0 400 0 90 0\nbroken 1 2 3\nnospace\n\n";
    let updates = ResponseParser::parse_line_batch(text, DeviceKind::Robot).unwrap();

    assert_eq!(updates.len(), 2);
    assert_eq!(
        updates[1],
        NodeUpdate::Position {
            node: "shoulder".to_string(),
            pose: Pose::new(0.0, 0.0, 400.0, 0.0, 90.0, 0.0),
        }
    );
}

#[test]
fn test_tool_line_batch_keeps_descriptor() {
    let text = "jaw_left move 0 0 12.5\njaw_right  move 0 0 -12.5 \n";
    let updates = ResponseParser::parse_line_batch(text, DeviceKind::Tool).unwrap();

    assert_eq!(
        updates,
        vec![
            NodeUpdate::Action {
                node: "jaw_left".to_string(),
                action: "move 0 0 12.5".to_string(),
            },
            NodeUpdate::Action {
                node: "jaw_right".to_string(),
                action: "move 0 0 -12.5".to_string(),
            },
        ]
    );
}

#[test]
fn test_empty_batch_is_no_data() {
    assert_eq!(ResponseParser::parse_line_batch("", DeviceKind::Robot), None);
    assert_eq!(ResponseParser::parse_line_batch(" \n\n", DeviceKind::Tool), None);
    assert_eq!(
        ResponseParser::parse_line_batch("nospace", DeviceKind::Tool),
        Some(vec![])
    );
}

#[test]
fn test_payload_empty_vs_no_data() {
    let none: Option<Vec<StateItem>> = ResponseParser::parse_payload("  ", "states").unwrap();
    assert_eq!(none, None);

    let empty: Option<Vec<StateItem>> = ResponseParser::parse_payload("[]", "states").unwrap();
    assert_eq!(empty, Some(vec![]));
}

#[test]
fn test_payload_never_partial() {
    let text = r#"[{"name":"Load","data":[]},{"name":42}]"#;
    let result = ResponseParser::parse_payload::<Chart>(text, "charts");
    assert!(result.is_err());
}

#[test]
fn test_done_message_variants() {
    assert_eq!(
        ResponseParser::parse_status("<done: Connected to 10.0.0.5 >").unwrap(),
        ResponseStatus::Done("Connected to 10.0.0.5".to_string())
    );
    assert_eq!(
        ResponseParser::parse_status("<done>").unwrap(),
        ResponseStatus::Done("Done".to_string())
    );
}

proptest! {
    #[test]
    fn prop_six_numbers_parse_in_order(c in prop::array::uniform6(-1.0e6f64..1.0e6)) {
        let text = c.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
        let pose = ResponseParser::parse_pose(&text).unwrap();
        prop_assert_eq!(pose.components(), c);
    }

    #[test]
    fn prop_wrong_count_is_rejected(values in prop::collection::vec(-1.0e3f64..1.0e3, 0..12)) {
        prop_assume!(values.len() != 6);
        let text = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
        prop_assert!(ResponseParser::parse_pose(&text).is_err());
    }

    #[test]
    fn prop_status_message_is_trimmed(msg in "[a-zA-Z0-9 ]{0,24}") {
        let text = format!("<failed:{}>", msg);
        let status = ResponseParser::parse_status(&text).unwrap();
        let expected = if msg.trim().is_empty() { "Failed" } else { msg.trim() };
        prop_assert_eq!(status.message(), expected);
        prop_assert!(!status.is_done());
    }
}
