//! Normalizer totality over arbitrary JSON

use proptest::prelude::*;
use serde_json::{json, Value};

use draftio::shared::{normalize_message, Frame, RelayEvent};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        ".{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::hash_map(
                prop_oneof![
                    Just("id".to_string()),
                    Just("_id".to_string()),
                    Just("senderId".to_string()),
                    Just("sender".to_string()),
                    Just("content".to_string()),
                    Just("createdAt".to_string()),
                    "[a-z_]{1,8}",
                ],
                inner,
                0..6
            )
            .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn test_normalize_never_panics(payload in arb_json()) {
        let message = normalize_message(&payload);
        if !payload.is_object() {
            prop_assert!(message.id.is_empty());
            prop_assert!(message.sender_id.is_empty());
            prop_assert!(message.content.is_empty());
        }
    }

    #[test]
    fn test_message_frames_always_decode(payload in arb_json()) {
        for event in ["receive_message", "message_sent"] {
            let frame = Frame { event: event.to_string(), data: payload.clone() };
            let decoded = RelayEvent::from_frame(&frame);
            prop_assert!(matches!(
                decoded,
                Some(RelayEvent::ReceiveMessage(_)) | Some(RelayEvent::MessageSent(_))
            ));
        }
    }

    #[test]
    fn test_string_ids_pass_through(id in "[a-zA-Z0-9]{1,24}", sender in "[a-z]{1,12}") {
        let camel = normalize_message(&json!({ "_id": id, "senderId": sender }));
        let snake = normalize_message(&json!({ "id": id, "sender_id": sender }));
        prop_assert_eq!(&camel.id, &id);
        prop_assert_eq!(&camel.sender_id, &sender);
        prop_assert_eq!(camel.id, snake.id);
        prop_assert_eq!(camel.sender_id, snake.sender_id);
    }
}

#[test]
fn test_empty_and_non_object_payloads() {
    for payload in [json!({}), json!(null), json!(42), json!("text"), json!([1, 2])] {
        let message = normalize_message(&payload);
        assert_eq!(message.id, "");
        assert_eq!(message.sender_id, "");
        assert_eq!(message.content, "");
    }
}
