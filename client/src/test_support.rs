//! Shared test doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and under the `test-support` feature.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{
    AuthApi, BackendError, LoginResponse, ProfileApi, RetrySleeper, TicketApi, UpdateAck,
};
use crate::domain::{
    AuthToken, LoginCredentials, NewTicket, OtpVerification, PasswordReset, PasswordResetRequest,
    Profile, Registration, ResourcePath, Role, StaffMember, Ticket, TicketId,
    TicketUpdateRequest, UserId,
};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("{what} mutex poisoned"),
    }
}

/// Clock whose time only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}")
            }
        };
        *lock(&self.0, "clock") += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0, "clock") += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0, "clock")
    }
}

/// Sleeper that returns at once and remembers every requested pause.
#[derive(Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    /// Pauses requested so far, in order.
    pub fn recorded(&self) -> Vec<Duration> {
        lock(&self.0, "sleeper").clone()
    }
}

#[async_trait]
impl RetrySleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.0, "sleeper").push(duration);
    }
}

/// Credential file location inside a temporary directory removed on drop.
pub struct TempCredentialFile {
    dir: tempfile::TempDir,
}

impl TempCredentialFile {
    /// Create the backing directory. The file itself is not created.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Path of the credential file.
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("credentials.json")
    }
}

#[derive(Default)]
struct FakeBackendState {
    login: Option<LoginResponse>,
    next_failure: Option<BackendError>,
    requests: usize,
    next_ticket_id: u32,
    tickets: Vec<Ticket>,
    submissions: Vec<NewTicket>,
    updates: Vec<TicketUpdateRequest>,
    staff: Vec<StaffMember>,
    profiles: BTreeMap<String, Profile>,
    registrations: Vec<String>,
}

/// In-memory backend implementing every API port.
///
/// Behaves like a well-mannered server: tickets get sequential ids, updates
/// are applied and echoed with HTTP 200, and listings filter by reporter.
/// A scripted failure can be queued for the next request.
#[derive(Default)]
pub struct FakeBackend(Mutex<FakeBackendState>);

impl FakeBackend {
    /// Answer logins with `response`.
    pub fn with_login(self, response: LoginResponse) -> Self {
        lock(&self.0, "backend").login = Some(response);
        self
    }

    /// Add a staff directory entry.
    pub fn with_staff(self, member: StaffMember) -> Self {
        lock(&self.0, "backend").staff.push(member);
        self
    }

    /// Serve `profile` at `path`.
    pub fn with_profile(self, path: &str, profile: Profile) -> Self {
        lock(&self.0, "backend")
            .profiles
            .insert(path.to_owned(), profile);
        self
    }

    /// Fail the next request with `error`.
    pub fn fail_next(&self, error: BackendError) {
        lock(&self.0, "backend").next_failure = Some(error);
    }

    /// Number of requests received.
    pub fn request_count(&self) -> usize {
        lock(&self.0, "backend").requests
    }

    /// Creation payloads received.
    pub fn submissions(&self) -> Vec<NewTicket> {
        lock(&self.0, "backend").submissions.clone()
    }

    /// Update payloads received.
    pub fn updates(&self) -> Vec<TicketUpdateRequest> {
        lock(&self.0, "backend").updates.clone()
    }

    /// Profile currently stored at `path`.
    pub fn profile_at(&self, path: &str) -> Option<Profile> {
        lock(&self.0, "backend").profiles.get(path).cloned()
    }

    /// Usernames that registered.
    pub fn registrations(&self) -> Vec<String> {
        lock(&self.0, "backend").registrations.clone()
    }

    fn begin(&self) -> Result<MutexGuard<'_, FakeBackendState>, BackendError> {
        let mut state = lock(&self.0, "backend");
        state.requests += 1;
        match state.next_failure.take() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn login(&self, _credentials: &LoginCredentials) -> Result<LoginResponse, BackendError> {
        let state = self.begin()?;
        state
            .login
            .clone()
            .ok_or_else(|| BackendError::unauthorized(401_u16, "Invalid credentials"))
    }

    async fn register(&self, registration: &Registration) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        state.registrations.push(registration.username().to_owned());
        Ok(())
    }

    async fn verify_otp(&self, _verification: &OtpVerification) -> Result<(), BackendError> {
        self.begin().map(drop)
    }

    async fn request_password_reset(
        &self,
        _request: &PasswordResetRequest,
    ) -> Result<(), BackendError> {
        self.begin().map(drop)
    }

    async fn reset_password(&self, _reset: &PasswordReset) -> Result<(), BackendError> {
        self.begin().map(drop)
    }
}

#[async_trait]
impl TicketApi for FakeBackend {
    async fn create_ticket(
        &self,
        ticket: &NewTicket,
        _token: &AuthToken,
    ) -> Result<Option<Ticket>, BackendError> {
        let mut state = self.begin()?;
        state.next_ticket_id += 1;
        let mut stored = Ticket::from_submission(ticket);
        stored.id = Some(TicketId::new(state.next_ticket_id.to_string()));
        state.submissions.push(ticket.clone());
        state.tickets.push(stored.clone());
        Ok(Some(stored))
    }

    async fn update_ticket(
        &self,
        request: &TicketUpdateRequest,
        _token: &AuthToken,
    ) -> Result<UpdateAck, BackendError> {
        let mut state = self.begin()?;
        state.updates.push(request.clone());
        let Some(ticket) = state
            .tickets
            .iter_mut()
            .find(|ticket| ticket.id.as_ref() == Some(&request.ticket_id))
        else {
            return Err(BackendError::rejected(404_u16, "Ticket not found"));
        };
        ticket.issue = request.issue.clone();
        ticket.status = request.status;
        ticket.assigned_staff = request.assigned_staff.clone();
        ticket.date_finished = request.date_finished;
        Ok(UpdateAck {
            status_code: 200,
            ticket: Some(ticket.clone()),
        })
    }

    async fn list_tickets(
        &self,
        user_id: &UserId,
        _token: &AuthToken,
    ) -> Result<Vec<Ticket>, BackendError> {
        let state = self.begin()?;
        Ok(state
            .tickets
            .iter()
            .filter(|ticket| {
                ticket
                    .reporter
                    .as_ref()
                    .is_some_and(|reporter| reporter.number() == user_id)
            })
            .cloned()
            .collect())
    }

    async fn list_staff(&self, _token: &AuthToken) -> Result<Vec<StaffMember>, BackendError> {
        Ok(self.begin()?.staff.clone())
    }
}

#[async_trait]
impl ProfileApi for FakeBackend {
    async fn fetch_profile(
        &self,
        path: &ResourcePath,
        _role: Role,
        _token: &AuthToken,
    ) -> Result<Profile, BackendError> {
        let state = self.begin()?;
        state
            .profiles
            .get(&path.to_string())
            .cloned()
            .ok_or_else(|| BackendError::rejected(404_u16, "Profile not found"))
    }

    async fn update_profile(
        &self,
        path: &ResourcePath,
        profile: &Profile,
        _token: &AuthToken,
    ) -> Result<(), BackendError> {
        let mut state = self.begin()?;
        state.profiles.insert(path.to_string(), profile.clone());
        Ok(())
    }
}
