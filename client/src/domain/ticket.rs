//! Ticket records, the status state machine, and request shapes.
//!
//! Tickets are server-owned. The client holds working copies for the length
//! of a view or edit cycle and describes the changes it wants through
//! [`NewTicket`] and [`TicketUpdateRequest`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};

use super::{Error, IdentifyingField, Role, UserId, route_for};

/// Server-assigned ticket identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketId(String);

impl TicketId {
    /// Wrap a server identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for TicketId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Ticket lifecycle status.
///
/// `ToDo -> InProgress -> {Done, Closed}`. Done and Closed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TicketStatus {
    /// Reported, not yet picked up.
    ToDo,
    /// Being worked on by staff.
    InProgress,
    /// Resolved.
    Done,
    /// Closed without further work.
    Closed,
}

impl TicketStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::ToDo, Self::InProgress, Self::Done, Self::Closed];

    /// Wire and display text.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
            Self::Closed => "Closed",
        }
    }

    /// Whether no further transition is offered.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Closed)
    }

    /// Whether entering this status stamps `dateFinished`.
    pub const fn finishes_ticket(self) -> bool {
        self.is_terminal()
    }

    /// Statuses reachable from this one.
    ///
    /// # Examples
    /// ```
    /// use reportit::domain::TicketStatus;
    ///
    /// assert!(TicketStatus::Closed.next_statuses().is_empty());
    /// assert_eq!(
    ///     TicketStatus::InProgress.next_statuses(),
    ///     &[TicketStatus::Done, TicketStatus::Closed]
    /// );
    /// ```
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::ToDo => &[Self::InProgress, Self::Done, Self::Closed],
            Self::InProgress => &[Self::Done, Self::Closed],
            Self::Done | Self::Closed => &[],
        }
    }

    /// Whether an update may move a ticket from `self` to `target`.
    ///
    /// Keeping the current status is always allowed so staff can be
    /// reassigned without touching the lifecycle.
    pub fn allows(self, target: Self) -> bool {
        self == target || self.next_statuses().contains(&target)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim();
        Self::ALL
            .into_iter()
            .find(|status| {
                status.as_str().eq_ignore_ascii_case(normalized)
                    || status
                        .as_str()
                        .replace(' ', "")
                        .eq_ignore_ascii_case(normalized)
            })
            .ok_or_else(|| Error::invalid_request(format!("Unknown ticket status `{normalized}`.")))
    }
}

/// Identity of the person who reported a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reporter {
    /// Reported by a student.
    Student { student_number: UserId },
    /// Reported by an employee.
    Employee { employee_number: UserId },
}

impl Reporter {
    /// Build the reporter for a session, if the role reports tickets.
    ///
    /// The variant is chosen through the role router's identifying field.
    pub fn for_role(role: Role, user_id: &UserId) -> Option<Self> {
        match route_for(role).identifying_field() {
            IdentifyingField::StudentNumber => Some(Self::Student {
                student_number: user_id.clone(),
            }),
            IdentifyingField::EmployeeNumber => Some(Self::Employee {
                employee_number: user_id.clone(),
            }),
            IdentifyingField::StaffNumber => None,
        }
    }

    /// Identifying number of the reporter.
    pub fn number(&self) -> &UserId {
        match self {
            Self::Student { student_number } => student_number,
            Self::Employee { employee_number } => employee_number,
        }
    }

    /// Payload field the number travels in.
    pub const fn identifying_field(&self) -> IdentifyingField {
        match self {
            Self::Student { .. } => IdentifyingField::StudentNumber,
            Self::Employee { .. } => IdentifyingField::EmployeeNumber,
        }
    }
}

/// Staff member identifier used for assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaffId(String);

impl StaffId {
    /// Validate a staff id, rejecting blanks.
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for StaffId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// One entry of the staff directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    /// Staff id used for assignment.
    pub id: StaffId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
}

impl StaffMember {
    /// Name shown in assignment pickers.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Working copy of a server ticket.
///
/// ## Invariants
/// - `date_finished` is present iff `status` is terminal (server enforced;
///   the client only ever sends payloads honouring it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Server identifier. Absent when the creation response did not echo
    /// the stored record.
    pub id: Option<TicketId>,
    /// Description of the problem.
    pub issue: String,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// Creation date.
    pub date_created: NaiveDate,
    /// Completion timestamp for Done/Closed tickets.
    pub date_finished: Option<DateTime<Utc>>,
    /// Reporter identity, when the server includes it.
    pub reporter: Option<Reporter>,
    /// Assigned staff id.
    pub assigned_staff: Option<StaffId>,
}

impl Ticket {
    /// Local view of a ticket the backend accepted without echoing it.
    pub fn from_submission(submission: &NewTicket) -> Self {
        Self {
            id: None,
            issue: submission.issue.clone(),
            status: submission.status,
            date_created: submission.date_created,
            date_finished: None,
            reporter: Some(submission.reporter.clone()),
            assigned_staff: None,
        }
    }
}

/// Creation request for `POST /ticket/add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    /// Trimmed, non-empty description.
    pub issue: String,
    /// Date-only creation stamp.
    pub date_created: NaiveDate,
    /// Always [`TicketStatus::ToDo`].
    pub status: TicketStatus,
    /// Reporter derived from the session.
    pub reporter: Reporter,
}

/// Update request for `PUT /ticket/update/{ticketId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketUpdateRequest {
    /// Ticket being updated.
    pub ticket_id: TicketId,
    /// Issue text; never blank.
    pub issue: String,
    /// Target status.
    pub status: TicketStatus,
    /// Staff assignment to send, either newly selected or carried over.
    pub assigned_staff: Option<StaffId>,
    /// Set exactly when `status` is Done or Closed.
    pub date_finished: Option<DateTime<Utc>>,
}

/// Changes a caller wants to apply to a ticket.
///
/// Empty fields keep the ticket's current values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketUpdate {
    /// Replacement issue text.
    pub issue: Option<String>,
    /// Target status.
    pub status: Option<TicketStatus>,
    /// Newly selected staff member.
    pub assign_staff: Option<StaffId>,
}

impl TicketUpdate {
    /// Build an update from raw form values.
    ///
    /// A blank `status` is a validation error; an unknown one too.
    pub fn from_form(issue: &str, status: &str, staff: &str) -> Result<Self, Error> {
        if status.trim().is_empty() {
            return Err(Error::invalid_request(ISSUE_AND_STATUS_REQUIRED));
        }
        let status = status.parse::<TicketStatus>()?;
        let issue = issue.trim();
        Ok(Self {
            issue: (!issue.is_empty()).then(|| issue.to_owned()),
            status: Some(status),
            assign_staff: StaffId::new(staff),
        })
    }
}

/// Message shown when an update lacks issue or status.
pub const ISSUE_AND_STATUS_REQUIRED: &str = "Issue and status are required fields!";

/// Screen state for the create-ticket form.
#[derive(Debug, Clone, Default)]
pub struct TicketForm {
    /// Description typed by the user. Cleared after a successful submit.
    pub description: String,
    /// Cooldown guarding the submit trigger.
    pub guard: super::SubmissionGuard,
}

impl TicketForm {
    /// Form pre-filled with a description.
    pub fn with_description(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("To Do", TicketStatus::ToDo)]
    #[case("in progress", TicketStatus::InProgress)]
    #[case("InProgress", TicketStatus::InProgress)]
    #[case(" done ", TicketStatus::Done)]
    #[case("CLOSED", TicketStatus::Closed)]
    fn statuses_parse_from_form_text(#[case] raw: &str, #[case] expected: TicketStatus) {
        assert_eq!(raw.parse::<TicketStatus>().expect("status"), expected);
    }

    #[rstest]
    fn unknown_status_is_a_validation_error() {
        let err = "Reopened".parse::<TicketStatus>().expect_err("unknown");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(TicketStatus::ToDo, TicketStatus::InProgress, true)]
    #[case(TicketStatus::ToDo, TicketStatus::Closed, true)]
    #[case(TicketStatus::InProgress, TicketStatus::Done, true)]
    #[case(TicketStatus::InProgress, TicketStatus::InProgress, true)]
    #[case(TicketStatus::InProgress, TicketStatus::ToDo, false)]
    #[case(TicketStatus::Done, TicketStatus::Closed, false)]
    #[case(TicketStatus::Closed, TicketStatus::InProgress, false)]
    #[case(TicketStatus::Done, TicketStatus::Done, true)]
    fn transitions_follow_the_lifecycle(
        #[case] from: TicketStatus,
        #[case] to: TicketStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.allows(to), allowed);
    }

    #[rstest]
    fn only_terminal_statuses_finish_tickets() {
        let finishing: Vec<_> = TicketStatus::ALL
            .into_iter()
            .filter(|status| status.finishes_ticket())
            .collect();
        assert_eq!(finishing, vec![TicketStatus::Done, TicketStatus::Closed]);
    }

    #[rstest]
    #[case(Role::Student, Some(IdentifyingField::StudentNumber))]
    #[case(Role::Employee, Some(IdentifyingField::EmployeeNumber))]
    #[case(Role::Staff, None)]
    fn reporters_follow_role(#[case] role: Role, #[case] field: Option<IdentifyingField>) {
        let user_id = UserId::new("CT21-0001").expect("user id");
        let reporter = Reporter::for_role(role, &user_id);
        assert_eq!(reporter.as_ref().map(Reporter::identifying_field), field);
        if let Some(reporter) = reporter {
            assert_eq!(reporter.number(), &user_id);
        }
    }

    #[rstest]
    fn form_update_requires_status() {
        let err = TicketUpdate::from_form("Printer jam", "  ", "").expect_err("blank status");
        assert_eq!(err.message(), ISSUE_AND_STATUS_REQUIRED);
    }

    #[rstest]
    fn form_update_treats_blanks_as_unchanged() {
        let update = TicketUpdate::from_form("  ", "Done", " ").expect("update");
        assert_eq!(
            update,
            TicketUpdate {
                issue: None,
                status: Some(TicketStatus::Done),
                assign_staff: None,
            }
        );
    }

    #[rstest]
    fn staff_display_name_joins_names() {
        let member = StaffMember {
            id: StaffId::new("7").expect("staff id"),
            first_name: "Grace".to_owned(),
            last_name: "Hopper".to_owned(),
        };
        assert_eq!(member.display_name(), "Grace Hopper");
    }
}
