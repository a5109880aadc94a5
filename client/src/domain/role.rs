//! Account roles recognised by the ticketing service.
//!
//! Roles form a closed, server-defined set. Anything outside it is a
//! configuration error rather than a user mistake.

use std::fmt;

use super::Error;

/// Role of the authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// A student reporter.
    Student,
    /// An employee reporter.
    Employee,
    /// Support staff who resolve tickets.
    Staff,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 3] = [Self::Student, Self::Employee, Self::Staff];

    /// Parse the role claim returned by `POST /user/login`.
    ///
    /// # Examples
    /// ```
    /// use reportit::domain::Role;
    ///
    /// assert_eq!(Role::from_server_claim("ROLE_STUDENT").unwrap(), Role::Student);
    /// assert!(Role::from_server_claim("ROLE_ADMIN").is_err());
    /// ```
    pub fn from_server_claim(claim: &str) -> Result<Self, Error> {
        match claim.trim() {
            "ROLE_STUDENT" => Ok(Self::Student),
            "ROLE_EMPLOYEE" => Ok(Self::Employee),
            "ROLE_MISSTAFF" => Ok(Self::Staff),
            other => Err(Error::configuration(format!(
                "unrecognised role claim `{other}`"
            ))),
        }
    }

    /// Parse the value persisted under the `userType` credential key.
    pub fn from_stored(value: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|role| role.stored_value() == value)
            .ok_or_else(|| Error::configuration(format!("unrecognised stored role `{value}`")))
    }

    /// Value persisted under the `userType` credential key.
    pub const fn stored_value(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Employee => "employee",
            Self::Staff => "misStaff",
        }
    }

    /// Whether accounts with this role may report tickets.
    pub const fn is_reporter(self) -> bool {
        matches!(self, Self::Student | Self::Employee)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stored_value())
    }
}
