//! List views: filtering and display helpers for blogs, contacts and scheduled calls

use crate::types::{Blog, Contact, ContactStatus, ScheduledCall};
use chrono::{DateTime, Utc};

/// Most tags shown per blog in the list view
pub const MAX_LISTED_TAGS: usize = 4;

/// Status filter of the contact list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every contact
    #[default]
    All,
    /// Only contacts with this status
    Only(ContactStatus),
}

impl std::str::FromStr for StatusFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Case-insensitive substring match; an empty or blank needle matches everything
fn matches_search(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Contacts matching `status` whose name contains `search`
#[must_use]
pub fn filter_contacts<'a>(
    contacts: &'a [Contact],
    status: StatusFilter,
    search: &str,
) -> Vec<&'a Contact> {
    contacts
        .iter()
        .filter(|contact| match status {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => contact.status == wanted,
        })
        .filter(|contact| matches_search(&contact.name, search))
        .collect()
}

/// Calls whose name or email contains `search`
#[must_use]
pub fn filter_calls<'a>(calls: &'a [ScheduledCall], search: &str) -> Vec<&'a ScheduledCall> {
    calls
        .iter()
        .filter(|call| matches_search(&call.name, search) || matches_search(&call.email, search))
        .collect()
}

/// Absolute URL of a stored image; relative paths are resolved against `asset_base_url`
#[must_use]
pub fn resolve_image_url(image: &str, asset_base_url: &str) -> String {
    if image.starts_with("http") {
        image.to_string()
    } else {
        format!(
            "{}/{}",
            asset_base_url.trim_end_matches('/'),
            image.trim_start_matches('/')
        )
    }
}

/// `dd/mm/yyyy • HH:MM`
#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y \u{2022} %H:%M").to_string()
}

/// `dd/mm/yyyy`, or empty when unknown
#[must_use]
pub fn format_date(at: Option<&DateTime<Utc>>) -> String {
    at.map(|at| at.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// One row of the blog list view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogSummary {
    /// Record id
    pub id: String,
    /// Title
    pub title: String,
    /// Teaser
    pub short_description: String,
    /// Author
    pub author: String,
    /// Category label
    pub category: String,
    /// At most [`MAX_LISTED_TAGS`] tags
    pub tags: Vec<String>,
    /// Absolute image URL
    pub image_url: Option<String>,
    /// Formatted creation time
    pub created: Option<String>,
}

impl BlogSummary {
    /// Summarise `blog` for display
    #[must_use]
    pub fn new(blog: &Blog, asset_base_url: &str) -> Self {
        Self {
            id: blog.id.clone(),
            title: blog.title.clone(),
            short_description: blog.short_description.clone(),
            author: blog.author.clone(),
            category: crate::blog::category_label(&blog.category).to_string(),
            tags: blog.tags.iter().take(MAX_LISTED_TAGS).cloned().collect(),
            image_url: blog
                .image
                .as_deref()
                .filter(|image| !image.is_empty())
                .map(|image| resolve_image_url(image, asset_base_url)),
            created: blog.created_at.as_ref().map(format_timestamp),
        }
    }
}
