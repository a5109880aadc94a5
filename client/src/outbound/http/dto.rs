//! Wire DTOs for the Report IT backend.
//!
//! The adapter decodes into these transport shapes first and maps them into
//! domain records in one pass. Field names follow the backend's camelCase
//! JSON.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    IdentifyingField, NewTicket, Profile, Registration, Reporter, Role, StaffId, StaffMember,
    Ticket, TicketId, TicketStatus, TicketUpdateRequest, UserId,
};

/// Identifier that the backend may encode as a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum IdDto {
    Text(String),
    Number(i64),
}

impl IdDto {
    pub(super) fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) username: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoginBodyDto {
    pub(super) token: Option<String>,
    pub(super) user_id: Option<IdDto>,
    pub(super) role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ServerMessageDto {
    pub(super) message: Option<String>,
    pub(super) error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StudentRefDto {
    pub(super) student_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EmployeeRefDto {
    pub(super) employee_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StaffRefDto {
    id: Option<IdDto>,
    staff_id: Option<IdDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StaffAssignmentDto {
    staff_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewTicketDto {
    issue: String,
    date_created: String,
    status: &'static str,
    student: Option<StudentRefDto>,
    employee: Option<EmployeeRefDto>,
}

impl From<&NewTicket> for NewTicketDto {
    fn from(ticket: &NewTicket) -> Self {
        let (student, employee) = reporter_refs(&ticket.reporter);
        Self {
            issue: ticket.issue.clone(),
            date_created: ticket.date_created.format("%Y-%m-%d").to_string(),
            status: ticket.status.as_str(),
            student,
            employee,
        }
    }
}

fn reporter_refs(reporter: &Reporter) -> (Option<StudentRefDto>, Option<EmployeeRefDto>) {
    match reporter {
        Reporter::Student { student_number } => (
            Some(StudentRefDto {
                student_number: student_number.to_string(),
            }),
            None,
        ),
        Reporter::Employee { employee_number } => (
            None,
            Some(EmployeeRefDto {
                employee_number: employee_number.to_string(),
            }),
        ),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TicketUpdateDto {
    ticket_id: String,
    issue: String,
    status: &'static str,
    mis_staff: Option<StaffAssignmentDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_finished: Option<String>,
}

impl From<&TicketUpdateRequest> for TicketUpdateDto {
    fn from(request: &TicketUpdateRequest) -> Self {
        Self {
            ticket_id: request.ticket_id.to_string(),
            issue: request.issue.clone(),
            status: request.status.as_str(),
            mis_staff: request
                .assigned_staff
                .as_ref()
                .map(|staff| StaffAssignmentDto {
                    staff_id: staff.to_string(),
                }),
            date_finished: request
                .date_finished
                .map(|finished| finished.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct TicketDto {
    #[serde(alias = "id")]
    ticket_id: Option<IdDto>,
    issue: String,
    status: String,
    date_created: String,
    date_finished: Option<String>,
    student: Option<StudentRefDto>,
    employee: Option<EmployeeRefDto>,
    mis_staff: Option<StaffRefDto>,
}

impl TicketDto {
    pub(super) fn into_domain(self) -> Result<Ticket, String> {
        let status = self
            .status
            .parse::<TicketStatus>()
            .map_err(|err| err.to_string())?;
        let date_created = parse_date(&self.date_created)
            .ok_or_else(|| format!("invalid dateCreated `{}`", self.date_created))?;
        let date_finished = match self.date_finished.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                Some(parse_timestamp(raw).ok_or_else(|| format!("invalid dateFinished `{raw}`"))?)
            }
        };
        let reporter = match (self.student, self.employee) {
            (Some(student), _) => UserId::new(student.student_number)
                .ok()
                .map(|student_number| Reporter::Student { student_number }),
            (None, Some(employee)) => UserId::new(employee.employee_number)
                .ok()
                .map(|employee_number| Reporter::Employee { employee_number }),
            (None, None) => None,
        };
        let assigned_staff = self
            .mis_staff
            .and_then(|staff| staff.id.or(staff.staff_id))
            .and_then(|id| StaffId::new(id.into_string()));

        Ok(Ticket {
            id: self.ticket_id.map(|id| TicketId::new(id.into_string())),
            issue: self.issue,
            status,
            date_created,
            date_finished,
            reporter,
            assigned_staff,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct StaffMemberDto {
    #[serde(alias = "staffId")]
    id: IdDto,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

impl StaffMemberDto {
    pub(super) fn into_domain(self) -> Result<StaffMember, String> {
        let id = StaffId::new(self.id.into_string())
            .ok_or_else(|| "staff member has a blank id".to_owned())?;
        Ok(StaffMember {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProfileDto {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    middle_name: Option<String>,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    contact_number: String,
    #[serde(default)]
    address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    birthdate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    student_number: Option<IdNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    employee_number: Option<IdNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mis_staff_number: Option<IdNumber>,
}

/// Identifying number accepted as text or number, always written as text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(super) enum IdNumber {
    Text(String),
    Number(i64),
}

impl IdNumber {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

impl ProfileDto {
    pub(super) fn from_domain(profile: &Profile) -> Self {
        let number = Some(IdNumber::Text(profile.identifying_number.clone()));
        let mut dto = Self {
            first_name: profile.first_name.clone(),
            middle_name: Some(profile.middle_name.clone()),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
            contact_number: profile.contact_number.clone(),
            address: profile.address.clone(),
            birthdate: profile
                .birthdate
                .map(|date| date.format("%Y-%m-%d").to_string()),
            ..Self::default()
        };
        match profile.identifying_field() {
            IdentifyingField::StudentNumber => dto.student_number = number,
            IdentifyingField::EmployeeNumber => dto.employee_number = number,
            IdentifyingField::StaffNumber => dto.mis_staff_number = number,
        }
        dto
    }

    pub(super) fn into_domain(self, role: Role) -> Result<Profile, String> {
        let number = match crate::domain::route_for(role).identifying_field() {
            IdentifyingField::StudentNumber => self.student_number,
            IdentifyingField::EmployeeNumber => self.employee_number,
            IdentifyingField::StaffNumber => self.mis_staff_number,
        };
        let birthdate = match self.birthdate.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date(raw).ok_or_else(|| format!("invalid birthdate `{raw}`"))?),
        };
        Ok(Profile {
            role,
            identifying_number: number.map(IdNumber::into_string).unwrap_or_default(),
            first_name: self.first_name,
            middle_name: self.middle_name.unwrap_or_default(),
            last_name: self.last_name,
            email: self.email,
            contact_number: self.contact_number,
            address: self.address,
            birthdate,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RegistrationDto<'a> {
    username: &'a str,
    password: &'a str,
    user_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    student: Option<ProfileDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    employee: Option<ProfileDto>,
}

impl<'a> From<&'a Registration> for RegistrationDto<'a> {
    fn from(registration: &'a Registration) -> Self {
        let profile = registration.profile();
        let details = ProfileDto::from_domain(profile);
        let (user_type, student, employee) = match profile.role {
            Role::Student => ("Student", Some(details), None),
            Role::Employee | Role::Staff => ("Employee", None, Some(details)),
        };
        Self {
            username: registration.username(),
            password: registration.password(),
            user_type,
            student,
            employee,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct OtpDto<'a> {
    pub(super) otp: &'a str,
    pub(super) username: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct ForgotPasswordDto<'a> {
    pub(super) username: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct VerifyForgotPasswordDto<'a> {
    pub(super) username: &'a str,
    pub(super) otp: &'a str,
    pub(super) password: &'a str,
}

/// Parse a date, accepting a full timestamp by taking its date part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Parse an RFC 3339 timestamp, a naive ISO timestamp (taken as UTC), or a
/// bare date (midnight UTC).
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
