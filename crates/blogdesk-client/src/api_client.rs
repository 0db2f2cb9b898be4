//! HTTP client for the blogdesk admin API

use crate::error::{ClientError, ClientResult};
use blogdesk_core::config::ApiConfig;
use blogdesk_core::types::{
    ApiMessage, Blog, BlogListResponse, BlogResponse, Contact, ContactListResponse,
    CreateAdminRequest, ScheduledCall, ScheduledCallListResponse,
};
use blogdesk_core::{CredentialStore, FormPayload, PayloadValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Message used when a protected call is attempted while signed out
pub const LOGIN_REQUIRED: &str = "Please log in.";

/// API client for the admin REST backend
///
/// Protected calls read the bearer token from the credential store on every request. A
/// 401/403 answer to a protected call clears the store, so the next navigation lands on
/// the login screen.
#[derive(Debug, Clone)]
pub struct ApiClient<S> {
    client: Client,
    base_url: String,
    store: S,
}

impl<S: CredentialStore> ApiClient<S> {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, store: S) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    /// Base URL every endpoint is relative to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential store used for bearer tokens
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) const fn http(&self) -> &Client {
        &self.client
    }

    /// Attach the stored bearer token, failing before the network if there is none
    fn authorized(&self, request: RequestBuilder) -> ClientResult<RequestBuilder> {
        match self.store.current()? {
            Some(credential) => Ok(request.bearer_auth(credential.token)),
            None => Err(ClientError::unauthorized(LOGIN_REQUIRED)),
        }
    }

    /// Attach the stored bearer token if there is one
    fn maybe_authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.current() {
            Ok(Some(credential)) => request.bearer_auth(credential.token),
            Ok(None) => request,
            Err(err) => {
                warn!(error = %err, "Credential store unreadable; sending request without token");
                request
            }
        }
    }

    /// Status handling shared by every endpoint
    async fn check(&self, response: Response, protected: bool) -> ClientResult<Response> {
        let status = response.status();

        if protected && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(status = status.as_u16(), "Credential rejected by server; signing out");
            if let Err(err) = self.store.clear() {
                warn!(error = %err, "Failed to clear rejected credential");
            }
            let message = error_message(response).await;
            return Err(ClientError::unauthorized(
                message.unwrap_or_else(|| LOGIN_REQUIRED.to_string()),
            ));
        }

        if !status.is_success() {
            let message = error_message(response).await;
            debug!(status = status.as_u16(), message = ?message, "API returned error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Send `request` and decode a JSON body of type `T`
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        protected: bool,
    ) -> ClientResult<(StatusCode, T)> {
        let response = self.check(request.send().await?, protected).await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            serde_json::from_slice(b"{}")?
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    /// Get all blog posts
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server reports no success.
    pub async fn list_blogs(&self) -> ClientResult<Vec<Blog>> {
        let request = self.client.get(self.url("/blog"));
        let (_, body): (_, BlogListResponse) = self.send_json(request, false).await?;
        if !body.success {
            return Err(ClientError::Rejected { message: None });
        }
        debug!(count = body.blogs.len(), "Fetched blogs");
        Ok(body.blogs)
    }

    /// Get a single blog post
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for a missing post, or another error if the request
    /// fails.
    pub async fn get_blog(&self, id: &str) -> ClientResult<Blog> {
        let request = self.client.get(self.url(&format!("/blog/{id}")));
        let body: BlogResponse = match self.send_json(request, false).await {
            Ok((_, body)) => body,
            Err(ClientError::Status { status: 404, .. }) => {
                return Err(ClientError::not_found("Blog"));
            }
            Err(err) => return Err(err),
        };

        match body.blog {
            Some(blog) if body.success => Ok(blog),
            _ => Err(ClientError::not_found("Blog")),
        }
    }

    /// Create a blog post from a multipart payload
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is stored, the request fails, or the server rejects
    /// the post.
    pub async fn create_blog(&self, payload: FormPayload) -> ClientResult<()> {
        let request = self
            .authorized(self.client.post(self.url("/blog")))?
            .multipart(multipart_form(payload)?);
        let (status, body): (_, ApiMessage) = self.send_json(request, true).await?;
        accepted(status, body, StatusCode::CREATED)
    }

    /// Update the given fields of a blog post
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is stored, the request fails, or the server rejects
    /// the update.
    pub async fn update_blog(&self, id: &str, payload: FormPayload) -> ClientResult<()> {
        let request = self
            .authorized(self.client.put(self.url(&format!("/blog/{id}"))))?
            .multipart(multipart_form(payload)?);
        let (status, body): (_, ApiMessage) = self.send_json(request, true).await?;
        accepted(status, body, StatusCode::OK)
    }

    /// Delete a blog post
    ///
    /// # Errors
    ///
    /// Returns an error if no credential is stored, the request fails, or the server answers
    /// `success: false`.
    pub async fn delete_blog(&self, id: &str) -> ClientResult<()> {
        let request = self.authorized(self.client.delete(self.url(&format!("/blog/{id}"))))?;
        let (_, body): (_, ApiMessage) = self.send_json(request, true).await?;
        if body.success {
            Ok(())
        } else {
            Err(ClientError::Rejected {
                message: body.message,
            })
        }
    }

    /// Get all contact leads; every lead starts out pending
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn list_contacts(&self) -> ClientResult<Vec<Contact>> {
        let request = self.maybe_authorized(self.client.get(self.url("/contact")));
        let (_, body): (_, ContactListResponse) = self.send_json(request, true).await?;
        Ok(body.contacts)
    }

    /// Get all scheduled calls
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn list_calls(&self) -> ClientResult<Vec<ScheduledCall>> {
        let request = self.maybe_authorized(self.client.get(self.url("/schedule-call")));
        let (_, body): (_, ScheduledCallListResponse) = self.send_json(request, true).await?;
        Ok(body.calls)
    }

    /// Create an admin account
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty fields before any request, or an error if the
    /// server rejects the account.
    pub async fn create_admin(&self, admin: &CreateAdminRequest) -> ClientResult<ApiMessage> {
        admin.validate()?;
        let request = self
            .maybe_authorized(self.client.post(self.url("/auth/create-admin")))
            .json(admin);
        let (_, body): (_, ApiMessage) = self.send_json(request, true).await?;
        Ok(body)
    }
}

/// A write is accepted on `success: true` or on the status the action answers with on success
fn accepted(status: StatusCode, body: ApiMessage, success_status: StatusCode) -> ClientResult<()> {
    if body.success || status == success_status {
        Ok(())
    } else {
        Err(ClientError::Rejected {
            message: body.message,
        })
    }
}

/// `message` field of an error body, if the body is JSON and has one
async fn error_message(response: Response) -> Option<String> {
    let bytes = response.bytes().await.ok()?;
    serde_json::from_slice::<ApiMessage>(&bytes)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.trim().is_empty())
}

/// Encode a form payload as multipart parts, files with their guessed content type
pub(crate) fn multipart_form(payload: FormPayload) -> ClientResult<Form> {
    payload
        .into_parts()
        .into_iter()
        .try_fold(Form::new(), |form, (name, value)| match value {
            PayloadValue::Text(text) => Ok(form.text(name, text)),
            PayloadValue::File(file) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.content_type)?;
                Ok(form.part(name, part))
            }
        })
}
