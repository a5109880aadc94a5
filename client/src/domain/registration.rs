//! Self-service registration for students and employees.
//!
//! Validation runs in form order and stops at the first problem, so the
//! message a user sees always names the earliest offending field.

use std::fmt;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use zeroize::Zeroizing;

use super::{Profile, Role};

/// Longest accepted contact number.
pub const CONTACT_NUMBER_MAX_LEN: usize = 11;

const USERNAME_SPECIALS: &str = "._@#&$%!*+=-";
const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Validation errors for the registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationValidationError {
    /// Staff accounts are provisioned by administrators.
    UnsupportedRole,
    /// A required field was blank.
    MissingRequiredFields,
    InvalidFirstName,
    InvalidMiddleName,
    InvalidLastName,
    /// Username lacked a special character or used a disallowed one.
    InvalidUsername,
    /// Password failed the strength rules.
    WeakPassword,
    ContactNumberTooLong,
    /// Student number did not match `CTyy-nnnn`.
    InvalidStudentNumber,
    /// Birthdate was missing, malformed, or not in the past.
    InvalidBirthdate,
}

impl fmt::Display for RegistrationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedRole => write!(f, "Only students and employees can register."),
            Self::MissingRequiredFields => write!(f, "All required fields must be filled."),
            Self::InvalidFirstName => write!(f, "Invalid Firstname"),
            Self::InvalidMiddleName => write!(f, "Invalid Middlename"),
            Self::InvalidLastName => write!(f, "Invalid Lastname"),
            Self::InvalidUsername => {
                write!(f, "Username must contain at least one special character")
            }
            Self::WeakPassword => write!(
                f,
                "Password must be at least 5 characters long and contain at least one special character."
            ),
            Self::ContactNumberTooLong => write!(
                f,
                "Contact number must be at most {CONTACT_NUMBER_MAX_LEN} digits."
            ),
            Self::InvalidStudentNumber => write!(f, "Invalid Student Number."),
            Self::InvalidBirthdate => write!(f, "Invalid Birthday"),
        }
    }
}

impl std::error::Error for RegistrationValidationError {}

static NAME_RE: OnceLock<Regex> = OnceLock::new();
static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static PASSWORD_RE: OnceLock<Regex> = OnceLock::new();
static STUDENT_NUMBER_RE: OnceLock<Regex> = OnceLock::new();

fn cached_regex(cell: &'static OnceLock<Regex>, pattern: &'static str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("registration regex `{pattern}` failed to compile: {error}"))
    })
}

fn name_regex() -> &'static Regex {
    cached_regex(&NAME_RE, r"^[A-Za-z\s]+$")
}

fn username_regex() -> &'static Regex {
    cached_regex(&USERNAME_RE, r"^[a-zA-Z0-9._@#&$%!*+=-]+$")
}

fn password_regex() -> &'static Regex {
    cached_regex(&PASSWORD_RE, r#"^[A-Za-z0-9!@#$%^&*(),.?":{}|<>]{5,}$"#)
}

fn student_number_regex() -> &'static Regex {
    cached_regex(&STUDENT_NUMBER_RE, r"^CT[0-9]{2}-[0-9]{4}$")
}

fn contains_any(value: &str, specials: &str) -> bool {
    value.chars().any(|ch| specials.contains(ch))
}

/// Raw registration form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub role: Role,
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub address: String,
    /// Student or employee number, depending on `role`.
    pub identifying_number: String,
    /// `YYYY-MM-DD`.
    pub birthdate: String,
}

/// Validated registration ready to send to `POST /user/register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: String,
    password: Zeroizing<String>,
    profile: Profile,
}

impl Registration {
    /// Validate a registration form.
    ///
    /// `today` anchors the birthdate check, which must fall strictly before
    /// it.
    pub fn try_from_form(
        form: &RegistrationForm,
        today: NaiveDate,
    ) -> Result<Self, RegistrationValidationError> {
        if !form.role.is_reporter() {
            return Err(RegistrationValidationError::UnsupportedRole);
        }

        let username = form.username.trim();
        let email = form.email.trim();
        let first_name = form.first_name.trim();
        let middle_name = form.middle_name.trim();
        let last_name = form.last_name.trim();
        let identifying_number = form.identifying_number.trim();
        let required = [
            username,
            form.password.as_str(),
            email,
            first_name,
            last_name,
            identifying_number,
        ];
        if required.iter().any(|value| value.is_empty()) {
            return Err(RegistrationValidationError::MissingRequiredFields);
        }

        if !name_regex().is_match(first_name) {
            return Err(RegistrationValidationError::InvalidFirstName);
        }
        if !middle_name.is_empty() && !name_regex().is_match(middle_name) {
            return Err(RegistrationValidationError::InvalidMiddleName);
        }
        if !name_regex().is_match(last_name) {
            return Err(RegistrationValidationError::InvalidLastName);
        }

        if !username_regex().is_match(username) || !contains_any(username, USERNAME_SPECIALS) {
            return Err(RegistrationValidationError::InvalidUsername);
        }
        if !password_regex().is_match(&form.password)
            || !contains_any(&form.password, PASSWORD_SPECIALS)
        {
            return Err(RegistrationValidationError::WeakPassword);
        }

        let contact_number = form.contact_number.trim();
        if contact_number.chars().count() > CONTACT_NUMBER_MAX_LEN {
            return Err(RegistrationValidationError::ContactNumberTooLong);
        }

        if form.role == Role::Student && !student_number_regex().is_match(identifying_number) {
            return Err(RegistrationValidationError::InvalidStudentNumber);
        }

        let birthdate = NaiveDate::parse_from_str(form.birthdate.trim(), "%Y-%m-%d")
            .map_err(|_| RegistrationValidationError::InvalidBirthdate)?;
        if birthdate >= today {
            return Err(RegistrationValidationError::InvalidBirthdate);
        }

        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(form.password.clone()),
            profile: Profile {
                role: form.role,
                identifying_number: identifying_number.to_owned(),
                first_name: first_name.to_owned(),
                middle_name: middle_name.to_owned(),
                last_name: last_name.to_owned(),
                email: email.to_owned(),
                contact_number: contact_number.to_owned(),
                address: form.address.trim().to_owned(),
                birthdate: Some(birthdate),
            },
        })
    }

    /// Login name for the new account.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password for the new account.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Profile nested under `student` or `employee` in the payload.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }
}
