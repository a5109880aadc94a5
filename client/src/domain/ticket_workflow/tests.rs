//! Tests for ticket submission, updates, and listings.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockTicketApi, UpdateAck};
use crate::domain::{AuthToken, ErrorCode, Role, StaffId, TicketId, UserId};
use crate::test_support::MutableClock;

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn session(role: Role) -> Session {
    Session::new(
        AuthToken::new("token-1").expect("token"),
        UserId::new("CT21-0042").expect("user id"),
        role,
    )
}

fn workflow(api: MockTicketApi) -> (TicketWorkflow<MockTicketApi>, Arc<MutableClock>) {
    let clock = Arc::new(MutableClock::new(start()));
    (TicketWorkflow::new(Arc::new(api), clock.clone()), clock)
}

#[fixture]
fn open_ticket() -> Ticket {
    Ticket {
        id: Some(TicketId::new("17")),
        issue: "Projector flickers".to_owned(),
        status: TicketStatus::ToDo,
        date_created: NaiveDate::from_ymd_opt(2026, 2, 27).expect("date"),
        date_finished: None,
        reporter: None,
        assigned_staff: StaffId::new("3"),
    }
}

fn ack(status_code: u16) -> UpdateAck {
    UpdateAck {
        status_code,
        ticket: None,
    }
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
#[tokio::test]
async fn blank_descriptions_send_nothing(#[case] description: &str) {
    let mut api = MockTicketApi::new();
    api.expect_create_ticket().times(0);
    let (workflow, clock) = workflow(api);
    let mut form = TicketForm::with_description(description);

    let err = workflow
        .submit_ticket(&mut form, &session(Role::Student))
        .await
        .expect_err("blank description");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), EMPTY_DESCRIPTION_MESSAGE);
    assert!(form.guard.is_enabled(clock.utc()));
}

#[rstest]
#[tokio::test]
async fn submit_sends_one_request_and_clears_form() {
    let mut api = MockTicketApi::new();
    api.expect_create_ticket()
        .withf(|ticket, token| {
            ticket.issue == "Printer jam"
                && ticket.status == TicketStatus::ToDo
                && ticket.date_created == start().date_naive()
                && token.expose() == "token-1"
        })
        .times(1)
        .returning(|_, _| Ok(None));
    let (workflow, clock) = workflow(api);
    let mut form = TicketForm::with_description("  Printer jam ");

    let ticket = workflow
        .submit_ticket(&mut form, &session(Role::Employee))
        .await
        .expect("submitted");

    assert!(form.description.is_empty());
    assert!(!form.guard.is_enabled(clock.utc()));
    assert_eq!(ticket.status, TicketStatus::ToDo);
    assert!(ticket.date_finished.is_none());
    assert_eq!(
        ticket.reporter,
        Some(Reporter::Employee {
            employee_number: UserId::new("CT21-0042").expect("user id"),
        })
    );
}

#[rstest]
#[tokio::test]
async fn staff_cannot_report_tickets() {
    let mut api = MockTicketApi::new();
    api.expect_create_ticket().times(0);
    let (workflow, _) = workflow(api);
    let mut form = TicketForm::with_description("Broken chair");

    let err = workflow
        .submit_ticket(&mut form, &session(Role::Staff))
        .await
        .expect_err("staff session");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(form.description, "Broken chair");
}

#[rstest]
#[tokio::test]
async fn failed_submit_keeps_description_and_guard_open() {
    let mut api = MockTicketApi::new();
    api.expect_create_ticket()
        .times(1)
        .returning(|_, _| Err(BackendError::transport("connection refused")));
    let (workflow, clock) = workflow(api);
    let mut form = TicketForm::with_description("No network in CL3");

    let err = workflow
        .submit_ticket(&mut form, &session(Role::Student))
        .await
        .expect_err("offline");

    assert_eq!(err.code(), ErrorCode::Network);
    assert_eq!(form.description, "No network in CL3");
    assert!(form.guard.is_enabled(clock.utc()));
}

#[rstest]
#[tokio::test]
async fn second_submit_inside_cooldown_is_refused() {
    let mut api = MockTicketApi::new();
    api.expect_create_ticket()
        .times(2)
        .returning(|_, _| Ok(None));
    let (workflow, clock) = workflow(api);
    let session = session(Role::Student);
    let mut form = TicketForm::with_description("First");

    workflow
        .submit_ticket(&mut form, &session)
        .await
        .expect("first submit");
    form.description = "Second".to_owned();
    clock.advance_seconds(3);
    let err = workflow
        .submit_ticket(&mut form, &session)
        .await
        .expect_err("cooling down");
    assert_eq!(err.code(), ErrorCode::Cooldown);

    clock.advance_seconds(2);
    workflow
        .submit_ticket(&mut form, &session)
        .await
        .expect("guard reopened");
}

#[rstest]
#[case(TicketStatus::Done)]
#[case(TicketStatus::Closed)]
#[tokio::test]
async fn finishing_statuses_stamp_date_finished(open_ticket: Ticket, #[case] target: TicketStatus) {
    let mut api = MockTicketApi::new();
    api.expect_update_ticket()
        .times(1)
        .returning(|_, _| Ok(ack(200)));
    let (workflow, clock) = workflow(api);
    let update = TicketUpdate {
        status: Some(target),
        ..TicketUpdate::default()
    };

    let outcome = workflow
        .update_ticket(&session(Role::Staff), &open_ticket, &update, || {})
        .await
        .expect("updated");

    assert_eq!(outcome.request.date_finished, Some(clock.utc()));
    let finished = outcome.ticket.date_finished.expect("finished");
    assert!(finished.date_naive() >= outcome.ticket.date_created);
}

#[rstest]
#[case(TicketStatus::ToDo)]
#[case(TicketStatus::InProgress)]
#[tokio::test]
async fn open_statuses_omit_date_finished(open_ticket: Ticket, #[case] target: TicketStatus) {
    let mut api = MockTicketApi::new();
    api.expect_update_ticket()
        .times(1)
        .returning(|_, _| Ok(ack(200)));
    let (workflow, _) = workflow(api);
    let update = TicketUpdate {
        status: Some(target),
        ..TicketUpdate::default()
    };

    let outcome = workflow
        .update_ticket(&session(Role::Staff), &open_ticket, &update, || {})
        .await
        .expect("updated");

    assert!(outcome.request.date_finished.is_none());
}

#[rstest]
#[case(TicketStatus::Done)]
#[case(TicketStatus::Closed)]
#[tokio::test]
async fn resaving_a_finished_ticket_restamps_date_finished(
    open_ticket: Ticket,
    #[case] status: TicketStatus,
) {
    let earlier = Utc
        .with_ymd_and_hms(2026, 2, 26, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    let finished = Ticket {
        status,
        date_finished: Some(earlier),
        ..open_ticket
    };
    let mut api = MockTicketApi::new();
    api.expect_update_ticket()
        .times(1)
        .returning(|_, _| Ok(ack(200)));
    let (workflow, clock) = workflow(api);
    let update = TicketUpdate {
        status: Some(status),
        assign_staff: StaffId::new("8"),
        ..TicketUpdate::default()
    };

    let outcome = workflow
        .update_ticket(&session(Role::Staff), &finished, &update, || {})
        .await
        .expect("updated");

    assert_eq!(outcome.request.date_finished, Some(clock.utc()));
    assert_ne!(outcome.request.date_finished, Some(earlier));
    assert_eq!(outcome.request.assigned_staff, StaffId::new("8"));
}

#[rstest]
#[tokio::test]
async fn staff_assignment_is_echoed_unless_replaced(open_ticket: Ticket) {
    let mut api = MockTicketApi::new();
    api.expect_update_ticket()
        .times(2)
        .returning(|_, _| Ok(ack(200)));
    let (workflow, _) = workflow(api);
    let session = session(Role::Staff);

    let kept = workflow
        .update_ticket(&session, &open_ticket, &TicketUpdate::default(), || {})
        .await
        .expect("echo");
    assert_eq!(kept.request.assigned_staff, StaffId::new("3"));
    assert_eq!(kept.request.issue, "Projector flickers");

    let replaced = workflow
        .update_ticket(
            &session,
            &open_ticket,
            &TicketUpdate {
                assign_staff: StaffId::new("9"),
                ..TicketUpdate::default()
            },
            || {},
        )
        .await
        .expect("reassign");
    assert_eq!(replaced.request.assigned_staff, StaffId::new("9"));
    assert_eq!(replaced.request.status, TicketStatus::ToDo);
}

#[rstest]
#[tokio::test]
async fn backwards_moves_are_refused_locally(mut open_ticket: Ticket) {
    open_ticket.status = TicketStatus::Closed;
    let mut api = MockTicketApi::new();
    api.expect_update_ticket().times(0);
    let (workflow, _) = workflow(api);
    let update = TicketUpdate {
        status: Some(TicketStatus::InProgress),
        ..TicketUpdate::default()
    };

    let err = workflow
        .update_ticket(&session(Role::Staff), &open_ticket, &update, || {})
        .await
        .expect_err("terminal ticket");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn blank_issue_everywhere_is_refused(mut open_ticket: Ticket) {
    open_ticket.issue = "  ".to_owned();
    let mut api = MockTicketApi::new();
    api.expect_update_ticket().times(0);
    let (workflow, _) = workflow(api);

    let err = workflow
        .update_ticket(&session(Role::Staff), &open_ticket, &TicketUpdate::default(), || {})
        .await
        .expect_err("no issue");
    assert_eq!(err.message(), ISSUE_AND_STATUS_REQUIRED);
}

#[rstest]
#[case::ok(200, true)]
#[case::accepted(202, false)]
#[tokio::test]
async fn refresh_runs_only_on_http_200(
    open_ticket: Ticket,
    #[case] status_code: u16,
    #[case] refreshed: bool,
) {
    let mut api = MockTicketApi::new();
    api.expect_update_ticket()
        .times(1)
        .returning(move |_, _| Ok(ack(status_code)));
    let (workflow, _) = workflow(api);
    let refreshes = AtomicUsize::new(0);

    let result = workflow
        .update_ticket(&session(Role::Staff), &open_ticket, &TicketUpdate::default(), || {
            refreshes.fetch_add(1, Ordering::SeqCst);
        })
        .await;

    assert_eq!(result.is_ok(), refreshed);
    assert_eq!(refreshes.load(Ordering::SeqCst), usize::from(refreshed));
}

#[rstest]
#[case::server_message(BackendError::rejected(400_u16, "Staff not found"), ErrorCode::Network, "Staff not found")]
#[case::no_message(BackendError::rejected(500_u16, ""), ErrorCode::Network, "An error occurred.")]
#[case::offline(BackendError::timeout("10s"), ErrorCode::Network, "Failed to update the ticket. Please try again later.")]
#[case::expired(BackendError::unauthorized(401_u16, "expired"), ErrorCode::SessionExpired, SESSION_ABSENT_MESSAGE)]
#[tokio::test]
async fn update_failures_carry_user_messages(
    open_ticket: Ticket,
    #[case] failure: BackendError,
    #[case] code: ErrorCode,
    #[case] message: &str,
) {
    let mut api = MockTicketApi::new();
    api.expect_update_ticket()
        .times(1)
        .return_once(move |_, _| Err(failure));
    let (workflow, _) = workflow(api);

    let err = workflow
        .update_ticket(&session(Role::Staff), &open_ticket, &TicketUpdate::default(), || {})
        .await
        .expect_err("failure");
    assert_eq!(err.code(), code);
    assert_eq!(err.message(), message);
}

#[rstest]
#[tokio::test]
async fn listing_preserves_server_order(open_ticket: Ticket) {
    let mut second = open_ticket.clone();
    second.id = Some(TicketId::new("4"));
    let expected = vec![open_ticket.clone(), second.clone()];
    let mut api = MockTicketApi::new();
    api.expect_list_tickets()
        .withf(|user_id, _| user_id.as_ref() == "CT21-0042")
        .times(1)
        .return_once(move |_, _| Ok(vec![open_ticket, second]));
    let (workflow, _) = workflow(api);

    let tickets = workflow
        .list_tickets(&session(Role::Student))
        .await
        .expect("tickets");
    assert_eq!(tickets, expected);
}

#[rstest]
#[tokio::test]
async fn staff_directory_failures_are_network_errors() {
    let mut api = MockTicketApi::new();
    api.expect_list_staff()
        .times(1)
        .returning(|_| Err(BackendError::transport("dns")));
    let (workflow, _) = workflow(api);

    let err = workflow
        .list_staff(&session(Role::Staff))
        .await
        .expect_err("offline");
    assert_eq!(err.code(), ErrorCode::Network);
}
