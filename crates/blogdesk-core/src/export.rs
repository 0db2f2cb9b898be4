//! CSV exports of the contact and scheduled-call lists

use crate::listing::format_date;
use crate::types::{Contact, ScheduledCall};
use crate::Result;
use std::io::Write;

/// Header row of the contact export
pub const CONTACT_HEADER: [&str; 7] = ["Sl No", "Name", "Email", "Phone", "Project", "Date", "Status"];

/// Header row of the scheduled-call export
pub const CALL_HEADER: [&str; 7] = [
    "Sl No",
    "Name",
    "Email",
    "Phone",
    "Preferred Date",
    "Message",
    "Enquiry Date",
];

/// Default file name of the contact export
pub const CONTACTS_FILE: &str = "contacts.csv";

/// Default file name of the scheduled-call export
pub const CALLS_FILE: &str = "schedule_calls.csv";

/// Write `contacts` as CSV, numbering rows from 1
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_contacts<W: Write>(writer: W, contacts: &[&Contact]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CONTACT_HEADER)?;
    for (index, contact) in contacts.iter().enumerate() {
        csv.write_record([
            (index + 1).to_string(),
            contact.name.clone(),
            contact.email.clone(),
            contact.phone.clone(),
            contact.project.clone(),
            format_date(contact.created_at.as_ref()),
            contact.status.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `calls` as CSV, numbering rows from 1
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_calls<W: Write>(writer: W, calls: &[&ScheduledCall]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CALL_HEADER)?;
    for (index, call) in calls.iter().enumerate() {
        csv.write_record([
            (index + 1).to_string(),
            call.name.clone(),
            call.email.clone(),
            call.phone.clone(),
            call.preferred_date.clone(),
            call.message.clone().unwrap_or_default(),
            format_date(call.created_at.as_ref()),
        ])?;
    }
    csv.flush()?;
    Ok(())
}
