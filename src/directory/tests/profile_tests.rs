//! Domain and adapter tests for directory profiles.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use crate::directory::{
    adapters::memory::InMemoryUserDirectory,
    domain::{ParsePresenceError, Presence, UserId, UserProfile},
    ports::UserDirectory,
};
use rstest::rstest;

fn profile(name: Option<&str>, email: &str) -> UserProfile {
    UserProfile::new(
        UserId::new(),
        name.map(str::to_owned),
        email.to_owned(),
        Presence::Online,
        None,
    )
}

#[rstest]
#[case("online", Presence::Online)]
#[case("offline", Presence::Offline)]
#[case("away", Presence::Away)]
#[case("busy", Presence::Busy)]
fn presence_round_trips_storage_form(#[case] raw: &str, #[case] expected: Presence) {
    let parsed = Presence::try_from(raw).expect("valid presence");
    assert_eq!(parsed, expected);
    assert_eq!(parsed.as_str(), raw);
}

#[rstest]
fn presence_rejects_unknown_values() {
    let result = Presence::try_from("vacationing");
    assert_eq!(result, Err(ParsePresenceError("vacationing".to_owned())));
}

#[rstest]
fn display_name_prefers_stored_name() {
    let entry = profile(Some("Alice Johnson"), "alice@example.com");
    assert_eq!(entry.display_name(), "Alice Johnson");
}

#[rstest]
fn display_name_falls_back_to_email_local_part() {
    let entry = profile(None, "alice@example.com");
    assert_eq!(entry.display_name(), "alice");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn memory_directory_finds_seeded_profiles() {
    let directory = InMemoryUserDirectory::new();
    let entry = profile(Some("Jane Smith"), "jane@example.com");
    let id = entry.id();
    directory.seed(entry.clone());

    let found = directory.find(id).await.expect("lookup should succeed");
    assert_eq!(found, Some(entry));

    let missing = directory
        .find(UserId::new())
        .await
        .expect("lookup should succeed");
    assert!(missing.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn memory_directory_lists_profiles_by_email() {
    let directory = InMemoryUserDirectory::new();
    directory.seed(profile(None, "zoe@example.com"));
    directory.seed(profile(None, "alice@example.com"));

    let listed = directory.list().await.expect("listing should succeed");
    let emails: Vec<&str> = listed.iter().map(UserProfile::email).collect();
    assert_eq!(emails, vec!["alice@example.com", "zoe@example.com"]);
}
