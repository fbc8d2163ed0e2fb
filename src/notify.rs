//! Notification fan-out. Runs synchronously inside the triggering
//! handler, but best-effort: a failed fan-out is logged and swallowed so
//! it never rolls back or fails the primary mutation.

use sqlx::PgPool;
use uuid::Uuid;

pub mod kinds {
    pub const NEW_MESSAGE: &str = "new_message";
    pub const NEW_EVENT: &str = "new_event";
    pub const GROUP_ADDED: &str = "group_added";
}

pub fn message_posted_text(sender_name: &str, group_name: &str) -> String {
    format!("Neue Nachricht von {sender_name} in {group_name}")
}

pub fn event_created_text(title: &str) -> String {
    format!("Neuer Termin: {title}")
}

pub fn member_added_text(group_name: &str) -> String {
    format!("Du wurdest zur Gruppe {group_name} hinzugefügt")
}

/// One notification for the user who was added to a group.
pub async fn member_added(pool: &PgPool, group_id: &str, group_name: &str, user_id: &str) {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications (notification_id, recipient_id, kind, message, group_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(kinds::GROUP_ADDED)
    .bind(member_added_text(group_name))
    .bind(group_id)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!("group_added fan-out failed for user {}: {}", user_id, e);
    }
}

/// One notification per group member except the sender.
pub async fn message_posted(
    pool: &PgPool,
    group_id: &str,
    group_name: &str,
    sender_id: &str,
    sender_name: &str,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications (notification_id, recipient_id, kind, message, group_id)
        SELECT gen_random_uuid()::text, user_id, $1, $2, $3
        FROM group_members
        WHERE group_id = $3 AND user_id <> $4
        "#,
    )
    .bind(kinds::NEW_MESSAGE)
    .bind(message_posted_text(sender_name, group_name))
    .bind(group_id)
    .bind(sender_id)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!("new_message fan-out failed for group {}: {}", group_id, e);
    }
}

/// One notification per registered user except the creator.
pub async fn event_created(pool: &PgPool, event_id: &str, title: &str, creator_id: &str) {
    let result = sqlx::query(
        r#"
        INSERT INTO notifications (notification_id, recipient_id, kind, message, event_id)
        SELECT gen_random_uuid()::text, user_id, $1, $2, $3
        FROM users
        WHERE user_id <> $4
        "#,
    )
    .bind(kinds::NEW_EVENT)
    .bind(event_created_text(title))
    .bind(event_id)
    .bind(creator_id)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!("new_event fan-out failed for event {}: {}", event_id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_texts_name_the_trigger() {
        assert_eq!(
            message_posted_text("Anna", "Vorstand"),
            "Neue Nachricht von Anna in Vorstand"
        );
        assert_eq!(event_created_text("Sommerfest"), "Neuer Termin: Sommerfest");
        assert_eq!(
            member_added_text("Team X"),
            "Du wurdest zur Gruppe Team X hinzugefügt"
        );
    }
}
