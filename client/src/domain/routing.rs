//! Role router: the single place where role-conditional behaviour lives.
//!
//! Profile endpoints, display labels, and the identifying-number field used in
//! ticket and profile payloads all hang off the session's role. Screens and
//! services ask [`route_for`] instead of branching on the role themselves.

use std::fmt;

use super::{Error, Role, UserId};

/// Placeholder substituted with the session's user id.
const USER_ID_PLACEHOLDER: &str = "{userId}";

/// Name of the payload field carrying the account's identifying number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifyingField {
    /// `studentNumber`
    StudentNumber,
    /// `employeeNumber`
    EmployeeNumber,
    /// `misStaffNumber`
    StaffNumber,
}

impl IdentifyingField {
    /// JSON key used on the wire.
    pub const fn json_key(self) -> &'static str {
        match self {
            Self::StudentNumber => "studentNumber",
            Self::EmployeeNumber => "employeeNumber",
            Self::StaffNumber => "misStaffNumber",
        }
    }

    /// Human-readable field name.
    pub const fn display_label(self) -> &'static str {
        match self {
            Self::StudentNumber => "Student number",
            Self::EmployeeNumber => "Employee number",
            Self::StaffNumber => "MIS staff number",
        }
    }
}

/// Endpoint path template parameterised by `{userId}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointTemplate(&'static str);

impl EndpointTemplate {
    /// Raw template text, e.g. `/student/{userId}`.
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// Substitute the user id, producing path segments.
    ///
    /// The user id always occupies exactly one segment, so ids containing
    /// `/` cannot escape into a different resource.
    ///
    /// # Examples
    /// ```
    /// use reportit::domain::{route_for, Role, UserId};
    ///
    /// let user_id = UserId::new("CT21-0001").unwrap();
    /// let path = route_for(Role::Student).read_endpoint().expand(&user_id);
    /// assert_eq!(path.to_string(), "/student/CT21-0001");
    /// ```
    pub fn expand(self, user_id: &UserId) -> ResourcePath {
        let segments = self
            .0
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                if segment == USER_ID_PLACEHOLDER {
                    user_id.as_ref().to_owned()
                } else {
                    segment.to_owned()
                }
            })
            .collect();
        ResourcePath { segments }
    }
}

/// A concrete backend path, kept as unencoded segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// Build a path from literal segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Path segments, unencoded.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Everything that varies by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRoute {
    read_endpoint: EndpointTemplate,
    update_endpoint: EndpointTemplate,
    label: &'static str,
    identifying_field: IdentifyingField,
}

impl RoleRoute {
    /// Profile read endpoint.
    pub const fn read_endpoint(&self) -> EndpointTemplate {
        self.read_endpoint
    }

    /// Profile update endpoint.
    pub const fn update_endpoint(&self) -> EndpointTemplate {
        self.update_endpoint
    }

    /// Display label, shown as the reporter type.
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Payload field carrying the identifying number.
    pub const fn identifying_field(&self) -> IdentifyingField {
        self.identifying_field
    }
}

const STUDENT_ROUTE: RoleRoute = RoleRoute {
    read_endpoint: EndpointTemplate("/student/{userId}"),
    update_endpoint: EndpointTemplate("/student/update/{userId}"),
    label: "Student",
    identifying_field: IdentifyingField::StudentNumber,
};

const EMPLOYEE_ROUTE: RoleRoute = RoleRoute {
    read_endpoint: EndpointTemplate("/employee/{userId}"),
    update_endpoint: EndpointTemplate("/employee/update/{userId}"),
    label: "Employee",
    identifying_field: IdentifyingField::EmployeeNumber,
};

const STAFF_ROUTE: RoleRoute = RoleRoute {
    read_endpoint: EndpointTemplate("/misStaff/{userId}"),
    update_endpoint: EndpointTemplate("/misStaff/update/{userId}"),
    label: "MIS Staff",
    identifying_field: IdentifyingField::StaffNumber,
};

/// Resolve the route for a role. Total and deterministic.
pub const fn route_for(role: Role) -> RoleRoute {
    match role {
        Role::Student => STUDENT_ROUTE,
        Role::Employee => EMPLOYEE_ROUTE,
        Role::Staff => STAFF_ROUTE,
    }
}

/// Resolve the route for a stored `userType` value.
///
/// Unknown values fail with [`crate::domain::ErrorCode::Configuration`].
pub fn route_for_stored(value: &str) -> Result<RoleRoute, Error> {
    Role::from_stored(value).map(route_for)
}
