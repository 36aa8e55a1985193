//! Notification projector invariants

use proptest::prelude::*;
use std::time::Duration;
use tokio::time::Instant;

use draftio::client::notifications::projector::{truncate_body, MAX_BODY_CHARS};
use draftio::client::notifications::{NotificationProjector, Projection, QueryCache, ToastQueue};
use draftio::shared::Message;

fn projector() -> NotificationProjector {
    NotificationProjector::new("me", QueryCache::new(), ToastQueue::new(Duration::from_secs(4)))
}

proptest! {
    #[test]
    fn test_truncation_bounds(body in "\\PC{0,200}") {
        let cut = truncate_body(&body);
        let chars = body.chars().count();
        if chars <= MAX_BODY_CHARS {
            prop_assert_eq!(cut, body);
        } else {
            prop_assert_eq!(cut.chars().count(), MAX_BODY_CHARS + 3);
            prop_assert!(cut.ends_with("..."));
            let prefix: String = body.chars().take(MAX_BODY_CHARS).collect();
            prop_assert!(cut.starts_with(&prefix));
        }
    }

    #[test]
    fn test_replayed_messages_insert_once(
        ids in prop::collection::vec("[a-z0-9]{1,6}", 1..20),
    ) {
        let projector = projector();
        let now = Instant::now();
        for id in ids.iter().chain(ids.iter()) {
            projector.on_message(&Message::new(id.as_str(), "u1", "me", "hi"), None, now);
        }

        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(projector.notifications().len(), unique.len());
    }

    #[test]
    fn test_focused_sender_never_projected(sender in "u[0-9]{1,3}", other in "v[0-9]{1,3}") {
        let projector = projector();
        let now = Instant::now();
        let suppressed = projector.on_message(
            &Message::new("a", sender.as_str(), "me", "x"),
            Some(sender.as_str()),
            now,
        );
        prop_assert_eq!(suppressed, Projection::Suppressed);

        let shown = projector.on_message(
            &Message::new("b", other.as_str(), "me", "x"),
            Some(sender.as_str()),
            now,
        );
        prop_assert!(matches!(shown, Projection::Inserted(_)));
        prop_assert_eq!(projector.notifications().len(), 1);
    }
}
