//! Domain primitives, policies, and use-case services.
//!
//! Purpose: model the Report IT session lifecycle and ticket workflow
//! without knowing how the backend is reached or where credentials live.
//! Adapters plug in through [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) with a stable `ErrorCode`.
//! - Session, Role, and the role router (`route_for`).
//! - SessionResolver, TicketWorkflow, ProfileEditor, AuthService.
//! - SubmissionGuard, the create-ticket cooldown.

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod ports;
pub mod profile;
pub mod profile_editor;
pub mod registration;
pub mod role;
pub mod routing;
pub mod session;
pub mod session_resolver;
pub mod submission_guard;
pub mod ticket;
pub mod ticket_workflow;

pub use self::auth::{
    AuthValidationError, LoginCredentials, OtpVerification, PasswordReset, PasswordResetRequest,
};
pub use self::auth_service::AuthService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::profile::Profile;
pub use self::profile_editor::{ProfileEditOutcome, ProfileEditor};
pub use self::registration::{Registration, RegistrationForm, RegistrationValidationError};
pub use self::role::Role;
pub use self::routing::{
    EndpointTemplate, IdentifyingField, ResourcePath, RoleRoute, route_for, route_for_stored,
};
pub use self::session::{AuthToken, Session, SessionValidationError, UserId};
pub use self::session_resolver::{MAX_TOKEN_ATTEMPTS, SessionResolver, TOKEN_RETRY_INTERVAL};
pub use self::submission_guard::{SUBMISSION_COOLDOWN, SubmissionGuard};
pub use self::ticket::{
    NewTicket, Reporter, StaffId, StaffMember, Ticket, TicketForm, TicketId, TicketStatus,
    TicketUpdate, TicketUpdateRequest,
};
pub use self::ticket_workflow::{TicketUpdateOutcome, TicketWorkflow};

/// Convenient result alias for domain operations.
///
/// # Examples
/// ```
/// use reportit::domain::{DomainResult, Error};
///
/// fn refuse() -> DomainResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(refuse().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
