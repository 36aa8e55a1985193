/**
 * Notification Push
 *
 * `POST /api/notifications` lets other services (likes, comments, follows)
 * push a notification to every live session of its recipient. The caller
 * must present a valid bearer token.
 */

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::backend::auth::AuthUser;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::shared::{Notification, NotificationType, SharedError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub recipient_id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationAccepted {
    pub id: String,
    /// Sessions the notification was queued on
    pub delivered: usize,
}

impl NotificationRequest {
    fn into_notification(self) -> Result<Notification, SharedError> {
        if self.recipient_id.trim().is_empty() {
            return Err(SharedError::validation("recipientId", "missing"));
        }
        Ok(Notification {
            id: uuid::Uuid::new_v4().to_string(),
            recipient_id: self.recipient_id,
            kind: self
                .kind
                .as_deref()
                .map(NotificationType::parse)
                .unwrap_or_default(),
            title: self.title,
            message: self.message,
            link: self.link.filter(|link| !link.is_empty()),
            read: false,
            created_at: Utc::now(),
        })
    }
}

pub async fn handle_push_notification(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(request): Json<NotificationRequest>,
) -> Result<(StatusCode, Json<NotificationAccepted>), BackendError> {
    let notification = request.into_notification()?;
    tracing::debug!(
        "[Notify] {} pushes {} to {}",
        caller.user_id,
        notification.id,
        notification.recipient_id
    );
    let delivered = state.hub.push_notification(&notification)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(NotificationAccepted {
            id: notification.id,
            delivered,
        }),
    ))
}
