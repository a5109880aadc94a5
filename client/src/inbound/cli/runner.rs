//! Executes parsed commands against the domain services.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use tracing::debug;

use super::{Command, ProfileCommand, ProfileEditArgs, RegisterArgs, TicketCommand, render};
use crate::domain::ports::{AuthApi, CredentialStore, ProfileApi, RetrySleeper, TicketApi};
use crate::domain::{
    AuthService, DomainResult, Error, Profile, ProfileEditor, RegistrationForm, Session,
    SessionResolver, TicketForm, TicketUpdate, TicketWorkflow,
};

/// Wires the domain services over one backend and one credential store.
pub struct CommandRunner<B, S> {
    auth: AuthService<B, S>,
    resolver: SessionResolver<S>,
    tickets: TicketWorkflow<B>,
    profiles: ProfileEditor<B>,
}

impl<B, S> CommandRunner<B, S>
where
    B: AuthApi + TicketApi + ProfileApi,
    S: CredentialStore,
{
    /// Build the runner.
    pub fn new(
        backend: Arc<B>,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn RetrySleeper>,
    ) -> Self {
        Self {
            auth: AuthService::new(Arc::clone(&backend), Arc::clone(&store), Arc::clone(&clock)),
            resolver: SessionResolver::new(store, sleeper),
            tickets: TicketWorkflow::new(Arc::clone(&backend), clock),
            profiles: ProfileEditor::new(backend),
        }
    }

    /// Run one command, returning the text to print.
    ///
    /// Commands that need a session resolve it first and issue no request
    /// when it is absent.
    pub async fn run(&self, command: Command) -> DomainResult<String> {
        match command {
            Command::Login { username, password } => {
                self.auth.login(&username, &password).await?;
                Ok(self.auth.greeting().await)
            }
            Command::Logout => {
                self.auth.logout().await?;
                Ok("Logged out.".to_owned())
            }
            Command::Greet => Ok(self.auth.greeting().await),
            Command::Register(args) => self
                .auth
                .register(&registration_form(args))
                .await
                .map(str::to_owned),
            Command::VerifyOtp { username, otp } => self
                .auth
                .verify_otp(&username, &otp)
                .await
                .map(str::to_owned),
            Command::ForgotPassword { username } => self
                .auth
                .request_password_reset(&username)
                .await
                .map(str::to_owned),
            Command::ResetPassword {
                username,
                otp,
                new_password,
            } => self
                .auth
                .reset_password(&username, &otp, &new_password)
                .await
                .map(str::to_owned),
            Command::Ticket(command) => self.run_ticket(command).await,
            Command::Staff => {
                let session = self.resolver.require().await?;
                let members = self.tickets.list_staff(&session).await?;
                Ok(render::staff(&members))
            }
            Command::Profile(command) => self.run_profile(command).await,
        }
    }

    async fn run_ticket(&self, command: TicketCommand) -> DomainResult<String> {
        let session = self.resolver.require().await?;
        match command {
            TicketCommand::Create { description } => {
                let mut form = TicketForm::with_description(description);
                let ticket = self.tickets.submit_ticket(&mut form, &session).await?;
                Ok(format!(
                    "Ticket submitted successfully!\n{}",
                    render::ticket(&ticket)
                ))
            }
            TicketCommand::List => {
                let tickets = self.tickets.list_tickets(&session).await?;
                Ok(render::tickets(&tickets))
            }
            TicketCommand::Update {
                ticket_id,
                issue,
                status,
                assign_staff,
            } => {
                let update = TicketUpdate::from_form(&issue, &status, &assign_staff)?;
                self.update_ticket(&session, ticket_id.trim(), &update).await
            }
        }
    }

    async fn update_ticket(
        &self,
        session: &Session,
        ticket_id: &str,
        update: &TicketUpdate,
    ) -> DomainResult<String> {
        let current = self
            .tickets
            .list_tickets(session)
            .await?
            .into_iter()
            .find(|ticket| ticket.id.as_ref().is_some_and(|id| id.as_ref() == ticket_id))
            .ok_or_else(|| Error::invalid_request(format!("Ticket {ticket_id} was not found.")))?;

        let mut refresh_requested = false;
        let outcome = self
            .tickets
            .update_ticket(session, &current, update, || refresh_requested = true)
            .await?;

        let mut out = format!(
            "Ticket updated successfully!\n{}",
            render::ticket(&outcome.ticket)
        );
        if refresh_requested {
            debug!(ticket_id, "refreshing ticket list after update");
            let tickets = self.tickets.list_tickets(session).await?;
            out.push_str("\n\nYour tickets:\n");
            out.push_str(&render::tickets(&tickets));
        }
        Ok(out)
    }

    async fn run_profile(&self, command: ProfileCommand) -> DomainResult<String> {
        let session = self.resolver.require().await?;
        let current = self.profiles.load(&session).await?;
        match command {
            ProfileCommand::Show => Ok(render::profile(&current)),
            ProfileCommand::Edit(args) => {
                let draft = apply_edits(&current, args)?;
                let outcome = self.profiles.edit(&session, &current, draft).await?;
                Ok(outcome.notice().to_owned())
            }
        }
    }
}

fn registration_form(args: RegisterArgs) -> RegistrationForm {
    RegistrationForm {
        role: args.account_type.into(),
        username: args.username,
        password: args.password,
        email: args.email,
        first_name: args.first_name,
        middle_name: args.middle_name,
        last_name: args.last_name,
        contact_number: args.contact_number,
        address: args.address,
        identifying_number: args.number,
        birthdate: args.birthdate,
    }
}

/// Overlay the provided fields on the current profile.
fn apply_edits(current: &Profile, args: ProfileEditArgs) -> DomainResult<Profile> {
    let birthdate = match args.birthdate.as_deref().map(str::trim) {
        None => current.birthdate,
        Some("") => None,
        Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            Error::invalid_request("Birthdate must be in YYYY-MM-DD format.")
        })?),
    };
    let mut draft = current.clone();
    let fields = [
        (&mut draft.first_name, args.first_name),
        (&mut draft.middle_name, args.middle_name),
        (&mut draft.last_name, args.last_name),
        (&mut draft.email, args.email),
        (&mut draft.contact_number, args.contact_number),
        (&mut draft.address, args.address),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            *field = value.trim().to_owned();
        }
    }
    draft.birthdate = birthdate;
    Ok(draft)
}

#[cfg(test)]
mod tests;
