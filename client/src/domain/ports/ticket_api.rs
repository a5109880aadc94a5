//! Driven port for the backend's ticket and staff endpoints.

use async_trait::async_trait;

use crate::domain::{AuthToken, NewTicket, StaffMember, Ticket, TicketUpdateRequest, UserId};

use super::BackendError;

/// Successful answer to a ticket update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAck {
    /// HTTP status code of the response.
    pub status_code: u16,
    /// Updated record, when the backend echoed one.
    pub ticket: Option<Ticket>,
}

/// Ticket endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketApi: Send + Sync {
    /// `POST /ticket/add`. Returns the stored record when the body holds one.
    async fn create_ticket(
        &self,
        ticket: &NewTicket,
        token: &AuthToken,
    ) -> Result<Option<Ticket>, BackendError>;

    /// `PUT /ticket/update/{ticketId}`. Any 2xx answer is acknowledged.
    async fn update_ticket(
        &self,
        request: &TicketUpdateRequest,
        token: &AuthToken,
    ) -> Result<UpdateAck, BackendError>;

    /// `GET /tickets/user/{userId}`. An empty answer yields an empty list.
    async fn list_tickets(
        &self,
        user_id: &UserId,
        token: &AuthToken,
    ) -> Result<Vec<Ticket>, BackendError>;

    /// `GET /staff`.
    async fn list_staff(&self, token: &AuthToken) -> Result<Vec<StaffMember>, BackendError>;
}
