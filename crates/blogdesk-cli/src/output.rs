//! Terminal rendering of list and detail views

use blogdesk_core::blog::category_label;
use blogdesk_core::listing::{BlogSummary, format_date, format_timestamp, resolve_image_url};
use blogdesk_core::{Blog, Contact, Result, ScheduledCall};
use serde::Serialize;
use std::fmt::Write as _;

/// Pretty JSON of `value`
pub(crate) fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('\u{2026}');
        short
    }
}

/// Blog list as a table
pub(crate) fn blogs_table(blogs: &[BlogSummary]) -> String {
    if blogs.is_empty() {
        return "No blogs found.".to_string();
    }

    let mut out = format!(
        "{:<26} {:<32} {:<18} {:<20} {}\n",
        "ID", "TITLE", "AUTHOR", "CREATED", "TAGS"
    );
    for blog in blogs {
        let _ = writeln!(
            out,
            "{:<26} {:<32} {:<18} {:<20} {}",
            blog.id,
            truncate(&blog.title, 32),
            truncate(&blog.author, 18),
            blog.created.as_deref().unwrap_or("-"),
            blog.tags.join(", ")
        );
    }
    out
}

/// Everything about one blog
pub(crate) fn blog_detail(blog: &Blog, asset_base_url: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", blog.title);
    let _ = writeln!(out, "  id:          {}", blog.id);
    let _ = writeln!(out, "  summary:     {}", blog.short_description);
    let _ = writeln!(out, "  category:    {}", category_label(&blog.category));
    let _ = writeln!(out, "  author:      {}", blog.author);
    let _ = writeln!(out, "  tags:        {}", blog.tags.join(", "));
    if let Some(image) = blog.image.as_deref().filter(|image| !image.is_empty()) {
        let _ = writeln!(out, "  image:       {}", resolve_image_url(image, asset_base_url));
    }
    if let Some(created) = &blog.created_at {
        let _ = writeln!(out, "  created:     {}", format_timestamp(created));
    }
    let _ = write!(out, "\n{}", blog.description);
    out
}

/// Contact leads as a numbered table
pub(crate) fn contacts_table(contacts: &[&Contact]) -> String {
    if contacts.is_empty() {
        return "No contacts found.".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<24} {:<30} {:<16} {:<20} {:<10} {}\n",
        "SL NO", "NAME", "EMAIL", "PHONE", "PROJECT", "DATE", "STATUS"
    );
    for (index, contact) in contacts.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>5}  {:<24} {:<30} {:<16} {:<20} {:<10} {}",
            index + 1,
            truncate(&contact.name, 24),
            truncate(&contact.email, 30),
            contact.phone,
            truncate(&contact.project, 20),
            format_date(contact.created_at.as_ref()),
            contact.status
        );
    }
    out
}

/// Scheduled calls as a numbered table
pub(crate) fn calls_table(calls: &[&ScheduledCall]) -> String {
    if calls.is_empty() {
        return "No scheduled calls found.".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<24} {:<30} {:<16} {:<14} {:<10} {}\n",
        "SL NO", "NAME", "EMAIL", "PHONE", "PREFERRED", "ENQUIRY", "MESSAGE"
    );
    for (index, call) in calls.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>5}  {:<24} {:<30} {:<16} {:<14} {:<10} {}",
            index + 1,
            truncate(&call.name, 24),
            truncate(&call.email, 30),
            call.phone,
            call.preferred_date,
            format_date(call.created_at.as_ref()),
            truncate(call.message.as_deref().unwrap_or("-"), 40)
        );
    }
    out
}
