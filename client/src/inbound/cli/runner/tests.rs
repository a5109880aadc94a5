//! Tests for command execution against in-memory fakes.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{InMemoryCredentialStore, LoginResponse};
use crate::domain::profile_editor::{NO_CHANGES_MESSAGE, PROFILE_UPDATED_MESSAGE};
use crate::domain::{ErrorCode, Role};
use crate::test_support::{FakeBackend, MutableClock, RecordingSleeper};

struct Harness {
    backend: Arc<FakeBackend>,
    sleeper: Arc<RecordingSleeper>,
    runner: CommandRunner<FakeBackend, InMemoryCredentialStore>,
}

fn student_profile() -> Profile {
    Profile {
        role: Role::Student,
        identifying_number: "CT21-0042".to_owned(),
        first_name: "Ada".to_owned(),
        middle_name: String::new(),
        last_name: "Lovelace".to_owned(),
        email: "ada@example.edu".to_owned(),
        contact_number: "09171234567".to_owned(),
        address: "Analytical St".to_owned(),
        birthdate: NaiveDate::from_ymd_opt(2001, 12, 10),
    }
}

#[fixture]
fn harness() -> Harness {
    let backend = Arc::new(
        FakeBackend::default()
            .with_login(LoginResponse {
                token: Some("Bearer abc123".to_owned()),
                user_id: Some("CT21-0042".to_owned()),
                role: Some("ROLE_STUDENT".to_owned()),
            })
            .with_profile("/student/CT21-0042", student_profile()),
    );
    let clock = Arc::new(MutableClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
    ));
    let sleeper = Arc::new(RecordingSleeper::default());
    let runner = CommandRunner::new(
        Arc::clone(&backend),
        Arc::new(InMemoryCredentialStore::default()),
        clock,
        sleeper.clone(),
    );
    Harness {
        backend,
        sleeper,
        runner,
    }
}

async fn login(harness: &Harness) {
    harness
        .runner
        .run(Command::Login {
            username: "ada".to_owned(),
            password: "pw!".to_owned(),
        })
        .await
        .expect("login");
}

#[rstest]
#[tokio::test]
async fn ticket_commands_need_a_session_and_send_nothing(harness: Harness) {
    let err = harness
        .runner
        .run(Command::Ticket(TicketCommand::List))
        .await
        .expect_err("no session");

    assert_eq!(err.code(), ErrorCode::SessionExpired);
    assert_eq!(harness.backend.request_count(), 0);
    assert_eq!(harness.sleeper.recorded().len(), 2);
}

#[rstest]
#[tokio::test]
async fn login_greets_the_user(harness: Harness) {
    let greeting = harness
        .runner
        .run(Command::Login {
            username: "ada".to_owned(),
            password: "pw!".to_owned(),
        })
        .await
        .expect("login");
    assert_eq!(greeting, "Hello ada, Welcome to Report IT!");
}

#[rstest]
#[tokio::test]
async fn created_tickets_show_up_in_the_list(harness: Harness) {
    login(&harness).await;

    let created = harness
        .runner
        .run(Command::Ticket(TicketCommand::Create {
            description: "Printer jam".to_owned(),
        }))
        .await
        .expect("create");
    assert!(created.starts_with("Ticket submitted successfully!"));

    let listed = harness
        .runner
        .run(Command::Ticket(TicketCommand::List))
        .await
        .expect("list");
    assert!(listed.contains("#1 [To Do] Printer jam"));
}

#[rstest]
#[tokio::test]
async fn updates_render_the_refreshed_list(harness: Harness) {
    login(&harness).await;
    harness
        .runner
        .run(Command::Ticket(TicketCommand::Create {
            description: "Projector flickers".to_owned(),
        }))
        .await
        .expect("create");

    let output = harness
        .runner
        .run(Command::Ticket(TicketCommand::Update {
            ticket_id: "1".to_owned(),
            issue: String::new(),
            status: "done".to_owned(),
            assign_staff: "3".to_owned(),
        }))
        .await
        .expect("update");

    assert!(output.starts_with("Ticket updated successfully!"));
    assert!(output.contains("Your tickets:"));
    assert!(output.contains("#1 [Done] Projector flickers"));
    let updates = harness.backend.updates();
    assert_eq!(updates.len(), 1);
    assert!(updates[0].date_finished.is_some());
}

#[rstest]
#[tokio::test]
async fn updating_an_unknown_ticket_is_refused(harness: Harness) {
    login(&harness).await;

    let err = harness
        .runner
        .run(Command::Ticket(TicketCommand::Update {
            ticket_id: "99".to_owned(),
            issue: String::new(),
            status: "Closed".to_owned(),
            assign_staff: String::new(),
        }))
        .await
        .expect_err("unknown ticket");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(harness.backend.updates().is_empty());
}

#[rstest]
#[tokio::test]
async fn profile_edits_report_whether_anything_changed(harness: Harness) {
    login(&harness).await;

    let unchanged = harness
        .runner
        .run(Command::Profile(ProfileCommand::Edit(ProfileEditArgs {
            first_name: Some("Ada".to_owned()),
            ..ProfileEditArgs::default()
        })))
        .await
        .expect("no-op edit");
    assert_eq!(unchanged, NO_CHANGES_MESSAGE);

    let updated = harness
        .runner
        .run(Command::Profile(ProfileCommand::Edit(ProfileEditArgs {
            address: Some("  2 Engine Row ".to_owned()),
            ..ProfileEditArgs::default()
        })))
        .await
        .expect("edit");
    assert_eq!(updated, PROFILE_UPDATED_MESSAGE);
    let stored = harness
        .backend
        .profile_at("/student/update/CT21-0042")
        .expect("stored profile");
    assert_eq!(stored.address, "2 Engine Row");
}

#[rstest]
#[case::keeps(None, NaiveDate::from_ymd_opt(2001, 12, 10))]
#[case::clears(Some(""), None)]
#[case::replaces(Some("2000-01-31"), NaiveDate::from_ymd_opt(2000, 1, 31))]
fn birthdate_edits_overlay_the_current_value(
    #[case] raw: Option<&str>,
    #[case] expected: Option<NaiveDate>,
) {
    let args = ProfileEditArgs {
        birthdate: raw.map(str::to_owned),
        ..ProfileEditArgs::default()
    };
    let draft = apply_edits(&student_profile(), args).expect("draft");
    assert_eq!(draft.birthdate, expected);
}

#[rstest]
fn malformed_birthdates_are_rejected() {
    let args = ProfileEditArgs {
        birthdate: Some("10/12/2001".to_owned()),
        ..ProfileEditArgs::default()
    };
    let err = apply_edits(&student_profile(), args).expect_err("bad date");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
