//! Reqwest-backed adapter for the Report IT REST backend.
//!
//! This adapter owns transport details only: URL construction, bearer
//! headers, timeout and HTTP status mapping, and JSON decoding into domain
//! records. Business rules stay in the domain services.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{
    ForgotPasswordDto, LoginBodyDto, LoginRequestDto, NewTicketDto, OtpDto, ProfileDto,
    RegistrationDto, ServerMessageDto, StaffMemberDto, TicketDto, TicketUpdateDto,
    VerifyForgotPasswordDto,
};
use crate::domain::ports::{
    AuthApi, BackendError, LoginResponse, ProfileApi, TicketApi, UpdateAck,
};
use crate::domain::{
    AuthToken, LoginCredentials, NewTicket, OtpVerification, PasswordReset, PasswordResetRequest,
    Profile, Registration, ResourcePath, Role, StaffMember, Ticket, TicketUpdateRequest, UserId,
};

/// Status, authorization header, and body of a successful response.
struct RawResponse {
    status: StatusCode,
    authorization: Option<String>,
    body: Vec<u8>,
}

/// Backend adapter that issues JSON requests below one base URL.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// `base_url` should end with `/`; paths are appended below it.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint<I, S>(&self, segments: I) -> Result<Url, BackendError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                BackendError::transport(format!("base URL `{}` cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        token: Option<&AuthToken>,
    ) -> RequestBuilder {
        debug!(%method, %url, "sending backend request");
        let builder = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<RawResponse, BackendError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let authorization = response
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(RawResponse {
            status,
            authorization,
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl AuthApi for HttpBackend {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, BackendError> {
        let url = self.endpoint(["user", "login"])?;
        let payload = LoginRequestDto {
            username: credentials.username(),
            password: credentials.password(),
        };
        let response = self
            .execute(self.request(Method::POST, url, None).json(&payload))
            .await?;
        parse_login(response.authorization, &response.body)
    }

    async fn register(&self, registration: &Registration) -> Result<(), BackendError> {
        let url = self.endpoint(["user", "register"])?;
        let payload = RegistrationDto::from(registration);
        self.execute(self.request(Method::POST, url, None).json(&payload))
            .await
            .map(drop)
    }

    async fn verify_otp(&self, verification: &OtpVerification) -> Result<(), BackendError> {
        let url = self.endpoint(["user", "verify-otp"])?;
        let payload = OtpDto {
            otp: verification.otp(),
            username: verification.username(),
        };
        self.execute(self.request(Method::POST, url, None).json(&payload))
            .await
            .map(drop)
    }

    async fn request_password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(["user", "forgot-password"])?;
        let payload = ForgotPasswordDto {
            username: request.username(),
        };
        self.execute(self.request(Method::POST, url, None).json(&payload))
            .await
            .map(drop)
    }

    async fn reset_password(&self, reset: &PasswordReset) -> Result<(), BackendError> {
        let url = self.endpoint(["user", "verify-forgot-password"])?;
        let payload = VerifyForgotPasswordDto {
            username: reset.username(),
            otp: reset.otp(),
            password: reset.new_password(),
        };
        self.execute(self.request(Method::POST, url, None).json(&payload))
            .await
            .map(drop)
    }
}

#[async_trait]
impl TicketApi for HttpBackend {
    async fn create_ticket(
        &self,
        ticket: &NewTicket,
        token: &AuthToken,
    ) -> Result<Option<Ticket>, BackendError> {
        let url = self.endpoint(["ticket", "add"])?;
        let payload = NewTicketDto::from(ticket);
        let response = self
            .execute(self.request(Method::POST, url, Some(token)).json(&payload))
            .await?;
        Ok(parse_ticket_echo(&response.body))
    }

    async fn update_ticket(
        &self,
        request: &TicketUpdateRequest,
        token: &AuthToken,
    ) -> Result<UpdateAck, BackendError> {
        let url = self.endpoint(["ticket", "update", request.ticket_id.as_ref()])?;
        let payload = TicketUpdateDto::from(request);
        let response = self
            .execute(self.request(Method::PUT, url, Some(token)).json(&payload))
            .await?;
        Ok(UpdateAck {
            status_code: response.status.as_u16(),
            ticket: parse_ticket_echo(&response.body),
        })
    }

    async fn list_tickets(
        &self,
        user_id: &UserId,
        token: &AuthToken,
    ) -> Result<Vec<Ticket>, BackendError> {
        let url = self.endpoint(["tickets", "user", user_id.as_ref()])?;
        let response = self
            .execute(self.request(Method::GET, url, Some(token)))
            .await?;
        parse_tickets(response.status, &response.body)
    }

    async fn list_staff(&self, token: &AuthToken) -> Result<Vec<StaffMember>, BackendError> {
        let url = self.endpoint(["staff"])?;
        let response = self
            .execute(self.request(Method::GET, url, Some(token)))
            .await?;
        if response.status == StatusCode::NO_CONTENT || is_blank(&response.body) {
            return Ok(Vec::new());
        }
        decode::<Vec<StaffMemberDto>>(&response.body, "staff list")?
            .into_iter()
            .map(StaffMemberDto::into_domain)
            .collect::<Result<Vec<_>, _>>()
            .map_err(BackendError::decode)
    }
}

#[async_trait]
impl ProfileApi for HttpBackend {
    async fn fetch_profile(
        &self,
        path: &ResourcePath,
        role: Role,
        token: &AuthToken,
    ) -> Result<Profile, BackendError> {
        let url = self.endpoint(path.segments())?;
        let response = self
            .execute(self.request(Method::GET, url, Some(token)))
            .await?;
        decode::<ProfileDto>(&response.body, "profile")?
            .into_domain(role)
            .map_err(BackendError::decode)
    }

    async fn update_profile(
        &self,
        path: &ResourcePath,
        profile: &Profile,
        token: &AuthToken,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(path.segments())?;
        let payload = ProfileDto::from_domain(profile);
        self.execute(self.request(Method::PUT, url, Some(token)).json(&payload))
            .await
            .map(drop)
    }
}

/// Combine the `Authorization` header with the login body.
///
/// The header wins over a body `token`; the body supplies `userId` and
/// `role`.
fn parse_login(authorization: Option<String>, body: &[u8]) -> Result<LoginResponse, BackendError> {
    let decoded = if is_blank(body) {
        LoginBodyDto::default()
    } else {
        decode::<LoginBodyDto>(body, "login")?
    };
    let token = authorization
        .filter(|header| !header.trim().is_empty())
        .or(decoded.token);
    Ok(LoginResponse {
        token,
        user_id: decoded.user_id.map(|id| id.into_string()),
        role: decoded.role,
    })
}

/// Decode a ticket the server echoed back, ignoring bodies that are not one.
fn parse_ticket_echo(body: &[u8]) -> Option<Ticket> {
    if is_blank(body) {
        return None;
    }
    match serde_json::from_slice::<TicketDto>(body)
        .map_err(|error| error.to_string())
        .and_then(TicketDto::into_domain)
    {
        Ok(ticket) => Some(ticket),
        Err(error) => {
            debug!(%error, "ignoring undecodable ticket echo");
            None
        }
    }
}

fn parse_tickets(status: StatusCode, body: &[u8]) -> Result<Vec<Ticket>, BackendError> {
    if status == StatusCode::NO_CONTENT || is_blank(body) {
        return Ok(Vec::new());
    }
    decode::<Vec<TicketDto>>(body, "ticket list")?
        .into_iter()
        .map(TicketDto::into_domain)
        .collect::<Result<Vec<_>, _>>()
        .map_err(BackendError::decode)
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, BackendError> {
    serde_json::from_slice(body)
        .map_err(|error| BackendError::decode(format!("invalid {what} JSON payload: {error}")))
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

fn map_transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::timeout(error.to_string())
    } else {
        BackendError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> BackendError {
    debug!(status = status.as_u16(), body = %body_preview(body), "backend refused request");
    let message = server_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            BackendError::unauthorized(status.as_u16(), message)
        }
        _ => BackendError::rejected(status.as_u16(), message),
    }
}

/// Message the server attached to a failure: a JSON `message` or `error`
/// field, or a short plain-text body. HTML error pages yield nothing.
fn server_message(body: &[u8]) -> String {
    if let Ok(decoded) = serde_json::from_slice::<ServerMessageDto>(body) {
        return decoded.message.or(decoded.error).unwrap_or_default();
    }
    let preview = body_preview(body);
    if preview.starts_with('<') || preview.starts_with('{') || preview.starts_with('[') {
        String::new()
    } else {
        preview
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
