//! Ticket creation, status progression, and ticket/staff listings.
//!
//! The workflow owns every rule about what may be sent: blank descriptions
//! and backwards status moves are refused locally, completion timestamps are
//! stamped from the injected clock, and backend failures are folded into the
//! domain [`Error`] with the wording users see.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info, warn};

use super::ports::{BackendError, TicketApi};
use super::session_resolver::SESSION_ABSENT_MESSAGE;
use super::ticket::ISSUE_AND_STATUS_REQUIRED;
use super::{
    Error, NewTicket, Reporter, Session, StaffMember, Ticket, TicketForm, TicketStatus,
    TicketUpdate, TicketUpdateRequest,
};

/// Message returned for a blank ticket description.
pub const EMPTY_DESCRIPTION_MESSAGE: &str = "Description must contain an issue.";

const SUBMIT_FAILED: &str = "Failed to submit the ticket. Please try again.";
const UPDATE_REJECTED: &str = "Failed to update the ticket. Please try again.";
const UPDATE_UNREACHABLE: &str = "Failed to update the ticket. Please try again later.";
const UPDATE_SERVER_FALLBACK: &str = "An error occurred.";
const LIST_FAILED: &str = "Failed to fetch tickets. Please check your network connection.";
const STAFF_FAILED: &str = "Failed to fetch MIS staff. Please try again later.";

/// Result of a successful ticket update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketUpdateOutcome {
    /// Payload that was sent.
    pub request: TicketUpdateRequest,
    /// Ticket after the update: the server's echo, or the local copy with
    /// the request applied.
    pub ticket: Ticket,
}

/// Ticket use cases over a [`TicketApi`].
#[derive(Clone)]
pub struct TicketWorkflow<A> {
    api: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<A> TicketWorkflow<A>
where
    A: TicketApi,
{
    /// Create a workflow over a ticket API and a clock.
    pub fn new(api: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }

    /// Submit the form's description as a new ticket.
    ///
    /// On success the description is cleared and the form's guard starts
    /// cooling down. On failure the description is kept for a retry.
    pub async fn submit_ticket(
        &self,
        form: &mut TicketForm,
        session: &Session,
    ) -> Result<Ticket, Error> {
        let description = form.description.clone();
        let ticket = form
            .guard
            .run(self.clock.as_ref(), self.create(&description, session))
            .await?;
        form.description.clear();
        Ok(ticket)
    }

    async fn create(&self, description: &str, session: &Session) -> Result<Ticket, Error> {
        let issue = description.trim();
        if issue.is_empty() {
            return Err(Error::invalid_request(EMPTY_DESCRIPTION_MESSAGE));
        }
        let Some(reporter) = Reporter::for_role(session.role(), session.user_id()) else {
            return Err(Error::forbidden(format!(
                "{} accounts cannot report tickets.",
                super::route_for(session.role()).label()
            )));
        };

        let submission = NewTicket {
            issue: issue.to_owned(),
            date_created: self.clock.utc().date_naive(),
            status: TicketStatus::ToDo,
            reporter,
        };
        let stored = self
            .api
            .create_ticket(&submission, session.token())
            .await
            .map_err(|err| map_backend_error(&err, SUBMIT_FAILED, SUBMIT_FAILED))?;
        info!(
            user_id = %session.user_id(),
            echoed = stored.is_some(),
            "ticket submitted"
        );
        Ok(stored.unwrap_or_else(|| Ticket::from_submission(&submission)))
    }

    /// Apply `update` to `ticket`, running `on_refresh` once the backend
    /// answers with HTTP 200.
    pub async fn update_ticket<F>(
        &self,
        session: &Session,
        ticket: &Ticket,
        update: &TicketUpdate,
        on_refresh: F,
    ) -> Result<TicketUpdateOutcome, Error>
    where
        F: FnOnce(),
    {
        let request = self.build_update(ticket, update)?;
        let ack = self
            .api
            .update_ticket(&request, session.token())
            .await
            .map_err(|err| map_backend_error(&err, UPDATE_SERVER_FALLBACK, UPDATE_UNREACHABLE))?;

        if ack.status_code != 200 {
            warn!(status = ack.status_code, ticket_id = %request.ticket_id, "unexpected update status");
            return Err(Error::network(UPDATE_REJECTED));
        }
        info!(
            ticket_id = %request.ticket_id,
            status = %request.status,
            "ticket updated"
        );
        on_refresh();

        let updated = ack.ticket.unwrap_or_else(|| Ticket {
            id: Some(request.ticket_id.clone()),
            issue: request.issue.clone(),
            status: request.status,
            date_created: ticket.date_created,
            date_finished: request.date_finished,
            reporter: ticket.reporter.clone(),
            assigned_staff: request.assigned_staff.clone(),
        });
        Ok(TicketUpdateOutcome {
            request,
            ticket: updated,
        })
    }

    fn build_update(
        &self,
        ticket: &Ticket,
        update: &TicketUpdate,
    ) -> Result<TicketUpdateRequest, Error> {
        let Some(ticket_id) = ticket.id.clone() else {
            return Err(Error::invalid_request(
                "Ticket has no server id yet. Refresh the ticket list and try again.",
            ));
        };
        let issue = update
            .issue
            .as_deref()
            .map(str::trim)
            .filter(|issue| !issue.is_empty())
            .unwrap_or_else(|| ticket.issue.trim());
        if issue.is_empty() {
            return Err(Error::invalid_request(ISSUE_AND_STATUS_REQUIRED));
        }
        let status = update.status.unwrap_or(ticket.status);
        if !ticket.status.allows(status) {
            return Err(Error::invalid_request(format!(
                "A ticket cannot move from {} to {status}.",
                ticket.status
            )));
        }

        let date_finished = status.finishes_ticket().then(|| self.clock.utc());
        let assigned_staff = update
            .assign_staff
            .clone()
            .or_else(|| ticket.assigned_staff.clone());
        debug!(
            ticket_id = %ticket_id,
            from = %ticket.status,
            to = %status,
            reassigned = update.assign_staff.is_some(),
            "built ticket update"
        );
        Ok(TicketUpdateRequest {
            ticket_id,
            issue: issue.to_owned(),
            status,
            assigned_staff,
            date_finished,
        })
    }

    /// Tickets reported by the session's account, in server order.
    pub async fn list_tickets(&self, session: &Session) -> Result<Vec<Ticket>, Error> {
        self.api
            .list_tickets(session.user_id(), session.token())
            .await
            .map_err(|err| map_backend_error(&err, LIST_FAILED, LIST_FAILED))
    }

    /// Staff members available for assignment.
    pub async fn list_staff(&self, session: &Session) -> Result<Vec<StaffMember>, Error> {
        self.api
            .list_staff(session.token())
            .await
            .map_err(|err| map_backend_error(&err, STAFF_FAILED, STAFF_FAILED))
    }
}

/// Fold a backend failure into a domain error.
///
/// `rejected` is used when the server answered with a failure status and
/// supplied no message of its own; `unreachable` when no answer arrived.
pub(crate) fn map_backend_error(err: &BackendError, rejected: &str, unreachable: &str) -> Error {
    match err {
        BackendError::Unauthorized { .. } => Error::session_expired(SESSION_ABSENT_MESSAGE),
        BackendError::Rejected { .. } => {
            Error::network(err.server_message().unwrap_or(rejected))
        }
        BackendError::Transport { .. } | BackendError::Timeout { .. } => {
            Error::network(unreachable)
        }
        BackendError::Decode { message } => {
            Error::internal(format!("Unexpected response from the server: {message}"))
        }
    }
}

#[cfg(test)]
mod tests;
