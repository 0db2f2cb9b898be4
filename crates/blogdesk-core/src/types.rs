//! Resource records and request/response bodies exchanged with the REST API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned resource identifier
pub type ResourceId = String;

/// Read `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A blog post as returned by `GET /blog` and `GET /blog/:id`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    /// Unique identifier
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: ResourceId,

    /// Post title
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Teaser shown in listings
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_description: String,

    /// Category slug or free-form category
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,

    /// Author display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,

    /// Ordered tag list
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    /// Stored image reference, absolute URL or server-relative path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Rich-text body (HTML)
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Follow-up state of a contact lead
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactStatus {
    /// Not yet answered
    #[default]
    Pending,
    /// Answered by an admin
    Responded,
}

impl std::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Responded => write!(f, "Responded"),
        }
    }
}

impl std::str::FromStr for ContactStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "responded" => Ok(Self::Responded),
            other => Err(crate::Error::validation(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

/// A contact lead from `GET /contact`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Unique identifier
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: ResourceId,

    /// Contact name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Contact email
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,

    /// Contact phone
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,

    /// Project the lead asked about
    #[serde(default, deserialize_with = "null_as_default")]
    pub project: String,

    /// Submission time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Not sent by the server; every fetched lead starts as pending
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ContactStatus,
}

/// A call-back request from `GET /schedule-call`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCall {
    /// Unique identifier
    #[serde(rename = "_id", default, deserialize_with = "null_as_default")]
    pub id: ResourceId,

    /// Requester name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Requester email
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,

    /// Requester phone
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,

    /// Preferred call date as entered by the requester
    #[serde(default, deserialize_with = "null_as_default")]
    pub preferred_date: String,

    /// Optional message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Enquiry time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl LoginRequest {
    /// Both fields must be filled in
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first empty field.
    pub fn validate(&self) -> crate::Result<()> {
        for (field, value) in [("email", &self.email), ("password", &self.password)] {
            if value.trim().is_empty() {
                return Err(crate::Error::validation(field, "Please fill all fields"));
            }
        }
        Ok(())
    }
}

/// Response of `POST /auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token
    pub token: String,
}

/// Body of `POST /auth/create-admin`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdminRequest {
    /// Admin display name
    pub name: String,
    /// Admin email
    pub email: String,
    /// Initial password
    pub password: String,
}

impl CreateAdminRequest {
    /// All fields are required
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first empty field.
    pub fn validate(&self) -> crate::Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(crate::Error::validation(field, format!("{field} is required")));
            }
        }
        Ok(())
    }
}

/// Generic `{success, message?}` acknowledgement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Whether the server accepted the request
    #[serde(default)]
    pub success: bool,
    /// Optional human-readable message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response of `GET /blog`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogListResponse {
    /// Whether the server accepted the request
    #[serde(default)]
    pub success: bool,
    /// Blog posts
    #[serde(default)]
    pub blogs: Vec<Blog>,
}

/// Response of `GET /blog/:id`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlogResponse {
    /// Whether the server accepted the request
    #[serde(default)]
    pub success: bool,
    /// The post, absent when not found
    #[serde(default)]
    pub blog: Option<Blog>,
}

/// Response of `GET /contact`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactListResponse {
    /// Contact leads
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// Response of `GET /schedule-call`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduledCallListResponse {
    /// Scheduled calls
    #[serde(default)]
    pub calls: Vec<ScheduledCall>,
}
