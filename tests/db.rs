//! Integration tests against a live Postgres.
//!
//! Gated behind the `db-tests` feature so the default test run stays
//! database-free. Run with DATABASE_URL set:
//!
//!     cargo test --features db-tests
//!
//! Each test gets its own schema from `#[sqlx::test]`, with the crate's
//! migrations applied.

#![cfg(feature = "db-tests")]

use sqlx::PgPool;

use connecthub::error::AppError;
use connecthub::notify;
use connecthub::routes::event::{CreateEventRequest, Event};
use connecthub::routes::group::{CreateGroupRequest, Group};
use connecthub::routes::notification::Notification;
use connecthub::routes::user::{RegisterRequest, User};

async fn register(pool: &PgPool, email: &str, name: &str) -> User {
    User::register(
        pool,
        RegisterRequest {
            email: email.into(),
            password: "geheim123".into(),
            name: name.into(),
        },
    )
    .await
    .unwrap()
}

async fn make_group(pool: &PgPool, creator: &User, name: &str) -> Group {
    Group::create(
        pool,
        CreateGroupRequest {
            name: name.into(),
            description: None,
            group_type: Some("team".into()),
        },
        &creator.user_id,
    )
    .await
    .unwrap()
}

async fn make_event(pool: &PgPool, creator: &User, max_participants: Option<i32>) -> Event {
    Event::create(
        pool,
        CreateEventRequest {
            title: "Sommerfest".into(),
            description: None,
            date: "2030-06-01".into(),
            time: Some("18:00".into()),
            location: None,
            group_id: None,
            max_participants,
        },
        &creator.user_id,
    )
    .await
    .unwrap()
}

#[sqlx::test]
async fn duplicate_registration_is_a_conflict(pool: PgPool) {
    register(&pool, "anna@verein.de", "Anna").await;

    let err = User::register(
        &pool,
        RegisterRequest {
            email: "anna@verein.de".into(),
            password: "anderes-passwort".into(),
            name: "Anna Zwei".into(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}

#[sqlx::test]
async fn message_fan_out_reaches_members_but_not_the_sender(pool: PgPool) {
    let anna = register(&pool, "anna@verein.de", "Anna").await;
    let ben = register(&pool, "ben@verein.de", "Ben").await;
    let cara = register(&pool, "cara@verein.de", "Cara").await;

    let group = make_group(&pool, &anna, "Vorstand").await;
    Group::add_member(&pool, &group.group_id, &ben.user_id)
        .await
        .unwrap();

    notify::message_posted(&pool, &group.group_id, &group.name, &anna.user_id, &anna.name).await;

    let for_ben = Notification::list(&pool, &ben.user_id, 50).await.unwrap();
    assert_eq!(for_ben.len(), 1);
    assert_eq!(for_ben[0].kind, notify::kinds::NEW_MESSAGE);
    assert_eq!(for_ben[0].message, "Neue Nachricht von Anna in Vorstand");

    // The sender hears nothing, and neither does a non-member.
    let for_anna = Notification::list(&pool, &anna.user_id, 50).await.unwrap();
    assert!(for_anna.is_empty());
    let for_cara = Notification::list(&pool, &cara.user_id, 50).await.unwrap();
    assert!(for_cara.is_empty());
}

#[sqlx::test]
async fn event_fan_out_skips_the_creator(pool: PgPool) {
    let anna = register(&pool, "anna@verein.de", "Anna").await;
    let ben = register(&pool, "ben@verein.de", "Ben").await;

    let event = make_event(&pool, &anna, None).await;
    notify::event_created(&pool, &event.event_id, &event.title, &anna.user_id).await;

    assert!(
        Notification::list(&pool, &anna.user_id, 50)
            .await
            .unwrap()
            .is_empty()
    );
    let for_ben = Notification::list(&pool, &ben.user_id, 50).await.unwrap();
    assert_eq!(for_ben.len(), 1);
    assert_eq!(for_ben[0].kind, notify::kinds::NEW_EVENT);
    assert_eq!(for_ben[0].message, "Neuer Termin: Sommerfest");
}

#[sqlx::test]
async fn mark_all_read_zeroes_the_unread_count(pool: PgPool) {
    let anna = register(&pool, "anna@verein.de", "Anna").await;
    let ben = register(&pool, "ben@verein.de", "Ben").await;

    let vorstand = make_group(&pool, &anna, "Vorstand").await;
    let projekt = make_group(&pool, &anna, "Projekt").await;
    notify::member_added(&pool, &vorstand.group_id, &vorstand.name, &ben.user_id).await;
    notify::member_added(&pool, &projekt.group_id, &projekt.name, &ben.user_id).await;

    assert_eq!(Notification::unread_count(&pool, &ben.user_id).await.unwrap(), 2);

    let marked = Notification::mark_all_read(&pool, &ben.user_id).await.unwrap();
    assert_eq!(marked, 2);
    assert_eq!(Notification::unread_count(&pool, &ben.user_id).await.unwrap(), 0);

    // Idempotent: a second sweep finds nothing left to mark.
    let marked_again = Notification::mark_all_read(&pool, &ben.user_id).await.unwrap();
    assert_eq!(marked_again, 0);
    assert_eq!(Notification::unread_count(&pool, &ben.user_id).await.unwrap(), 0);
}

#[sqlx::test]
async fn attending_and_declining_are_mutually_exclusive(pool: PgPool) {
    let anna = register(&pool, "anna@verein.de", "Anna").await;
    let event = make_event(&pool, &anna, None).await;

    let event = Event::attend(&pool, &event.event_id, &anna.user_id).await.unwrap();
    assert!(event.attendees.contains(&anna.user_id));
    assert!(event.declined.is_empty());

    let event = Event::decline(&pool, &event.event_id, &anna.user_id).await.unwrap();
    assert!(!event.attendees.contains(&anna.user_id));
    assert!(event.declined.contains(&anna.user_id));

    // Flipping back moves the user, never duplicates them.
    let event = Event::attend(&pool, &event.event_id, &anna.user_id).await.unwrap();
    assert_eq!(event.attendees, vec![anna.user_id.clone()]);
    assert!(event.declined.is_empty());
}

#[sqlx::test]
async fn full_events_refuse_further_attendees(pool: PgPool) {
    let anna = register(&pool, "anna@verein.de", "Anna").await;
    let ben = register(&pool, "ben@verein.de", "Ben").await;
    let cara = register(&pool, "cara@verein.de", "Cara").await;

    let event = make_event(&pool, &anna, Some(2)).await;

    Event::attend(&pool, &event.event_id, &anna.user_id).await.unwrap();
    let full = Event::attend(&pool, &event.event_id, &ben.user_id).await.unwrap();
    assert_eq!(full.attendees.len(), 2);

    let err = Event::attend(&pool, &event.event_id, &cara.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Capacity), "got {err:?}");

    // Re-accepting never counts against the limit.
    let still_full = Event::attend(&pool, &event.event_id, &anna.user_id).await.unwrap();
    assert_eq!(still_full.attendees.len(), 2);

    // A declined attendee frees a seat.
    Event::decline(&pool, &event.event_id, &ben.user_id).await.unwrap();
    let reopened = Event::attend(&pool, &event.event_id, &cara.user_id).await.unwrap();
    assert!(reopened.attendees.contains(&cara.user_id));
    assert_eq!(reopened.attendees.len(), 2);
}
