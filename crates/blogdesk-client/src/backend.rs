//! Blog persistence for the form reconciler

use crate::api_client::ApiClient;
use async_trait::async_trait;
use blogdesk_core::{Blog, CredentialStore, FormPayload, ResourceBackend, Result};
use tracing::instrument;

#[async_trait]
impl<S> ResourceBackend<Blog> for ApiClient<S>
where
    S: CredentialStore,
{
    #[instrument(skip(self))]
    async fn fetch(&self, id: &str) -> Result<Blog> {
        Ok(self.get_blog(id).await?)
    }

    #[instrument(skip_all, fields(fields = ?payload.names()))]
    async fn create(&self, payload: FormPayload) -> Result<()> {
        Ok(self.create_blog(payload).await?)
    }

    #[instrument(skip(self, payload), fields(fields = ?payload.names()))]
    async fn update(&self, id: &str, payload: FormPayload) -> Result<()> {
        Ok(self.update_blog(id, payload).await?)
    }
}
