//! Plain-text rendering of command results.

use std::fmt::Write as _;

use crate::domain::{Profile, StaffMember, Ticket, route_for};

const NO_TICKETS: &str = "No tickets found.";
const NO_STAFF: &str = "No MIS staff found.";
const UNASSIGNED: &str = "Unassigned";
const NOT_FINISHED: &str = "N/A";

pub(super) fn ticket(ticket: &Ticket) -> String {
    let id = ticket
        .id
        .as_ref()
        .map_or_else(|| "(pending)".to_owned(), |id| format!("#{id}"));
    let finished = ticket.date_finished.map_or_else(
        || NOT_FINISHED.to_owned(),
        |finished| finished.date_naive().to_string(),
    );
    let staff = ticket
        .assigned_staff
        .as_ref()
        .map_or_else(|| UNASSIGNED.to_owned(), ToString::to_string);

    let mut out = format!("{id} [{}] {}\n", ticket.status, ticket.issue);
    let _ = write!(
        out,
        "    Created: {}  Finished: {finished}  MIS Staff: {staff}",
        ticket.date_created
    );
    let next = ticket.status.next_statuses();
    if !next.is_empty() {
        let options: Vec<&str> = next.iter().map(|status| status.as_str()).collect();
        let _ = write!(out, "\n    Next: {}", options.join(", "));
    }
    out
}

pub(super) fn tickets(tickets: &[Ticket]) -> String {
    if tickets.is_empty() {
        return NO_TICKETS.to_owned();
    }
    tickets.iter().map(ticket).collect::<Vec<_>>().join("\n")
}

pub(super) fn staff(members: &[StaffMember]) -> String {
    if members.is_empty() {
        return NO_STAFF.to_owned();
    }
    members
        .iter()
        .map(|member| format!("{}  {}", member.id, member.display_name()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn profile(profile: &Profile) -> String {
    let route = route_for(profile.role);
    let birthdate = profile
        .birthdate
        .map_or_else(String::new, |date| date.to_string());
    let rows = [
        ("Account", route.label().to_owned()),
        (
            route.identifying_field().display_label(),
            profile.identifying_number.clone(),
        ),
        ("Name", profile.full_name()),
        ("Email", profile.email.clone()),
        ("Contact number", profile.contact_number.clone()),
        ("Address", profile.address.clone()),
        ("Birthdate", birthdate),
    ];
    rows.iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
