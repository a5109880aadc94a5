//! Command-line front end.
//!
//! Argument types are clap derives; [`CommandRunner`] maps each command onto
//! a domain service call and renders the outcome as text. Rendering never
//! touches the terminal, so the runner is testable against fakes.

mod render;
mod runner;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::Role;

pub use runner::CommandRunner;

/// `reportit` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "reportit", about = "Report IT helpdesk client", version)]
pub struct Cli {
    /// Backend base URL. Overrides `REPORTIT_BASE_URL`.
    #[arg(long = "base-url", value_name = "url", global = true)]
    pub base_url: Option<String>,
    /// Credential file. Overrides `REPORTIT_CREDENTIALS_PATH`.
    #[arg(long = "credentials-path", value_name = "path", global = true)]
    pub credentials_path: Option<PathBuf>,
    /// Emit logs as JSON lines.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in and store the session on this device.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Remove the stored session.
    Logout,
    /// Print the home screen greeting.
    Greet,
    /// Create a student or employee account.
    Register(RegisterArgs),
    /// Confirm a registration with the emailed OTP.
    VerifyOtp {
        #[arg(long)]
        username: String,
        #[arg(long)]
        otp: String,
    },
    /// Request a password reset OTP.
    ForgotPassword {
        #[arg(long)]
        username: String,
    },
    /// Set a new password using the emailed OTP.
    ResetPassword {
        #[arg(long)]
        username: String,
        #[arg(long)]
        otp: String,
        #[arg(long = "new-password")]
        new_password: String,
    },
    /// Ticket operations.
    #[command(subcommand)]
    Ticket(TicketCommand),
    /// List staff available for assignment.
    Staff,
    /// Profile operations.
    #[command(subcommand)]
    Profile(ProfileCommand),
}

/// `reportit ticket ...`
#[derive(Debug, Clone, Subcommand)]
pub enum TicketCommand {
    /// Report a new issue.
    Create {
        #[arg(long)]
        description: String,
    },
    /// List tickets reported by the signed-in account.
    List,
    /// Change a ticket's issue, status, or assigned staff.
    Update {
        /// Server id of the ticket.
        ticket_id: String,
        /// Replacement issue text. Keeps the current issue when omitted.
        #[arg(long, default_value = "")]
        issue: String,
        /// Target status, e.g. "In Progress".
        #[arg(long)]
        status: String,
        /// Staff id to assign. Keeps the current assignment when omitted.
        #[arg(long = "assign-staff", default_value = "")]
        assign_staff: String,
    },
}

/// `reportit profile ...`
#[derive(Debug, Clone, Subcommand)]
pub enum ProfileCommand {
    /// Show the signed-in account's profile.
    Show,
    /// Change profile fields. Omitted fields keep their values.
    Edit(ProfileEditArgs),
}

/// Account type offered at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccountType {
    Student,
    Employee,
}

impl From<AccountType> for Role {
    fn from(account: AccountType) -> Self {
        match account {
            AccountType::Student => Self::Student,
            AccountType::Employee => Self::Employee,
        }
    }
}

/// Registration form fields.
#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    #[arg(long = "type", value_enum)]
    pub account_type: AccountType,
    #[arg(long)]
    pub username: String,
    #[arg(long)]
    pub password: String,
    #[arg(long)]
    pub email: String,
    #[arg(long = "first-name")]
    pub first_name: String,
    #[arg(long = "middle-name", default_value = "")]
    pub middle_name: String,
    #[arg(long = "last-name")]
    pub last_name: String,
    #[arg(long = "contact-number")]
    pub contact_number: String,
    #[arg(long)]
    pub address: String,
    /// Student number (`CTyy-nnnn`) or employee number.
    #[arg(long)]
    pub number: String,
    /// Date of birth as `YYYY-MM-DD`.
    #[arg(long)]
    pub birthdate: String,
}

/// Profile fields that may be edited.
#[derive(Debug, Clone, Default, Args)]
pub struct ProfileEditArgs {
    #[arg(long = "first-name")]
    pub first_name: Option<String>,
    #[arg(long = "middle-name")]
    pub middle_name: Option<String>,
    #[arg(long = "last-name")]
    pub last_name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long = "contact-number")]
    pub contact_number: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Date of birth as `YYYY-MM-DD`.
    #[arg(long)]
    pub birthdate: Option<String>,
}

#[cfg(test)]
mod tests {
    //! Argument parsing coverage.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn ticket_update_parses_positional_id_and_flags() {
        let cli = Cli::try_parse_from([
            "reportit",
            "ticket",
            "update",
            "17",
            "--status",
            "In Progress",
            "--assign-staff",
            "3",
        ])
        .expect("parse");
        let Command::Ticket(TicketCommand::Update {
            ticket_id,
            issue,
            status,
            assign_staff,
        }) = cli.command
        else {
            panic!("expected ticket update");
        };
        assert_eq!(ticket_id, "17");
        assert_eq!(issue, "");
        assert_eq!(status, "In Progress");
        assert_eq!(assign_staff, "3");
    }

    #[rstest]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "reportit",
            "greet",
            "--base-url",
            "http://helpdesk.local:8080",
            "--log-json",
        ])
        .expect("parse");
        assert_eq!(cli.base_url.as_deref(), Some("http://helpdesk.local:8080"));
        assert!(cli.log_json);
        assert!(matches!(cli.command, Command::Greet));
    }

    #[rstest]
    fn staff_accounts_cannot_be_registered() {
        let result = Cli::try_parse_from([
            "reportit",
            "register",
            "--type",
            "staff",
            "--username",
            "u",
        ]);
        assert!(result.is_err());
    }
}
