//! Dashboard screens
//!
//! Each public method is one screen. It first asks the gate for its route, then talks to
//! the API and prints the result.

use crate::output;
use crate::prompt;
use crate::{BlogEdits, ContactFilter, OutputFormat};
use blogdesk_client::{ApiClient, ClientError, LOGGED_OUT, LOGIN_FAILED, LOGIN_REQUIRED};
use blogdesk_core::blog::{CATEGORY_PRESETS, category_slugs, fields};
use blogdesk_core::export;
use blogdesk_core::form::Choice;
use blogdesk_core::listing::{BlogSummary, StatusFilter, filter_calls, filter_contacts};
use blogdesk_core::shell::ShellState;
use blogdesk_core::types::{CreateAdminRequest, LoginRequest};
use blogdesk_core::{
    AccessGate, AuthState, BlogForm, Config, CredentialStore, Error, FileCredentialStore, Gate,
    Result, Route, StagedFile, SubmitFailure, SubmitOutcome,
};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Convert a client error, substituting `fallback` when the server gave no message
fn with_fallback(err: ClientError, fallback: &str) -> Error {
    match Error::from(err) {
        Error::Network { message: None } => Error::network(fallback),
        other => other,
    }
}

/// Print the predefined blog categories
pub(crate) fn print_categories() {
    for (slug, label) in CATEGORY_PRESETS {
        println!("{slug:<28} {label}");
    }
}

/// Apply command line field changes to a blog form
fn apply_edits(form: &mut BlogForm, edits: &BlogEdits) -> Result<()> {
    if let Some(title) = &edits.title {
        form.set_text(fields::TITLE, title.as_str())?;
    }
    if let Some(short_description) = &edits.short_description {
        form.set_text(fields::SHORT_DESCRIPTION, short_description.as_str())?;
    }
    if let Some(category) = &edits.category {
        if !category_slugs().contains(&category.as_str()) {
            return Err(Error::validation(
                fields::CATEGORY,
                format!("unknown category '{category}'; use --custom-category for free text"),
            ));
        }
        form.select(fields::CATEGORY, Choice::Preset(category.clone()))?;
    }
    if let Some(custom) = &edits.custom_category {
        form.set_custom(fields::CATEGORY, custom.as_str())?;
    }
    if let Some(author) = &edits.author {
        form.set_text(fields::AUTHOR, author.as_str())?;
    }
    for tag in &edits.remove_tags {
        form.remove_tag(tag);
    }
    for tag in &edits.add_tags {
        form.add_tag(tag);
    }
    if let Some(path) = &edits.image {
        form.stage_file(fields::IMAGE, StagedFile::read_image(path)?)?;
    }
    if let Some(description) = &edits.description {
        form.set_text(fields::DESCRIPTION, description.as_str())?;
    }
    if let Some(path) = &edits.description_file {
        form.set_text(fields::DESCRIPTION, std::fs::read_to_string(path)?)?;
    }
    Ok(())
}

/// Turn a submission outcome into a message, or an error for the exit code
fn report(outcome: SubmitOutcome) -> Result<&'static str> {
    match outcome {
        SubmitOutcome::Created => Ok("Blog created successfully!"),
        SubmitOutcome::Updated => Ok("Blog updated successfully!"),
        SubmitOutcome::NoChange => Ok("No changes to update"),
        SubmitOutcome::Failed(SubmitFailure::Validation { field, message }) => {
            Err(Error::Validation { field, message })
        }
        SubmitOutcome::Failed(SubmitFailure::Unauthorized) => {
            Err(Error::Authentication(LOGIN_REQUIRED.to_string()))
        }
        SubmitOutcome::Failed(SubmitFailure::Rejected { message }) => Err(Error::network(message)),
    }
}

/// Write CSV to `output`, or stdout for `-`
fn write_export<F>(output: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    if output == Path::new("-") {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        write(&mut lock)
    } else {
        let mut file = std::fs::File::create(output)?;
        write(&mut file)?;
        eprintln!("Exported to {}", output.display());
        Ok(())
    }
}

/// The signed-in console: gate, API client and sidebar
#[derive(Debug)]
pub(crate) struct Console {
    config: Config,
    gate: AccessGate<FileCredentialStore>,
    client: ApiClient<FileCredentialStore>,
    shell: ShellState,
}

impl Console {
    /// Open the console with the credential file from `config`
    pub(crate) fn open(config: Config, collapsed: bool) -> Result<Self> {
        let store = FileCredentialStore::new(config.credential_path()?);
        debug!(path = %store.path().display(), "Using credential file");

        let client = ApiClient::new(&config.api, store.clone())?;
        let mut shell = ShellState::default();
        if collapsed {
            shell.toggle_sidebar();
        }

        Ok(Self {
            config,
            gate: AccessGate::new(store),
            client,
            shell,
        })
    }

    /// Ask the gate for `route`
    ///
    /// Returns `false` when the gate sends a signed-in user away from the login screen.
    fn enter(&mut self, route: Route) -> Result<bool> {
        match self.gate.navigate(route) {
            Gate::Allow(route) => {
                self.shell.follow(&route);
                Ok(true)
            }
            Gate::Redirect(Route::Login) => Err(Error::Authentication(LOGIN_REQUIRED.to_string())),
            Gate::Redirect(target) => {
                println!("Already signed in; nothing to do at {target}. Run `blogdesk logout` first.");
                Ok(false)
            }
        }
    }

    fn header(&self) {
        println!("{}\n", self.shell.render());
    }

    /// Login screen
    pub(crate) async fn login(mut self, email: Option<String>, password: Option<String>) -> Result<()> {
        if !self.enter(Route::Login)? {
            return Ok(());
        }

        let email = match email {
            Some(email) => email,
            None => prompt::ask("Email")?,
        };
        let password = match password {
            Some(password) => password,
            None => prompt::password("Password")?,
        };

        let request = LoginRequest { email, password };
        self.client
            .login(&request, self.config.session.ttl_days)
            .await
            .map_err(|err| with_fallback(err, LOGIN_FAILED))?;

        println!("Login successful!");
        Ok(())
    }

    /// Sidebar logout button
    pub(crate) fn logout(self) -> Result<()> {
        self.client.logout()?;
        println!("{LOGGED_OUT}");
        Ok(())
    }

    /// Session summary
    pub(crate) fn status(self) -> Result<()> {
        match self.gate.state() {
            AuthState::Authenticated => {
                let expires = self
                    .gate
                    .store()
                    .current()?
                    .map(|credential| credential.expires_at.to_rfc3339())
                    .unwrap_or_default();
                println!("Signed in (credential expires {expires})");
                self.header();
            }
            AuthState::Unauthenticated => println!("Signed out"),
        }
        println!("API: {}", self.client.base_url());
        Ok(())
    }

    /// Blog list screen
    pub(crate) async fn list_blogs(mut self, format: OutputFormat) -> Result<()> {
        self.enter(Route::Blogs)?;

        let blogs = self
            .client
            .list_blogs()
            .await
            .map_err(|err| with_fallback(err, "Failed to load blogs"))?;
        let summaries: Vec<_> = blogs
            .iter()
            .map(|blog| BlogSummary::new(blog, &self.config.api.asset_base_url))
            .collect();

        match format {
            OutputFormat::Json => println!("{}", output::json(&blogs)?),
            OutputFormat::Table => {
                self.header();
                print!("{}", output::blogs_table(&summaries));
            }
        }
        Ok(())
    }

    /// One blog post
    pub(crate) async fn show_blog(mut self, id: &str) -> Result<()> {
        self.enter(Route::Blogs)?;

        let blog = self.client.get_blog(id).await.map_err(|err| match err {
            ClientError::NotFound { .. } => Error::NotFound {
                resource: "Blog".to_string(),
            },
            other => with_fallback(other, "Failed to load blog data"),
        })?;
        println!("{}", output::blog_detail(&blog, &self.config.api.asset_base_url));
        Ok(())
    }

    /// Blog create form (`id` absent) or edit form
    pub(crate) async fn save_blog(mut self, id: Option<&str>, edits: &BlogEdits) -> Result<()> {
        let route = id.map_or(Route::NewBlog, |id| Route::EditBlog(id.to_string()));
        self.enter(route)?;

        let mut form = BlogForm::load(&self.client, id).await?;
        apply_edits(&mut form, edits)?;
        debug!(changed = ?form.diff(), "Blog form edited");

        let message = report(form.submit(&self.client).await)?;
        info!(message, "Blog form submitted");
        println!("{message}");
        Ok(())
    }

    /// Delete button on the blog list
    pub(crate) async fn delete_blog(mut self, id: &str, yes: bool) -> Result<()> {
        self.enter(Route::Blogs)?;

        if !yes && !prompt::confirm("Are you sure you want to delete this blog?")? {
            println!("Deletion cancelled");
            return Ok(());
        }

        match self.client.delete_blog(id).await {
            Ok(()) => {
                info!(id, "Blog deleted");
                println!("Blog deleted successfully");
                Ok(())
            }
            Err(ClientError::Rejected { .. }) => Err(Error::network("Unable to delete blog")),
            Err(err) => Err(with_fallback(err, "Something went wrong while deleting")),
        }
    }

    async fn filtered_contacts(&mut self, filter: &ContactFilter) -> Result<Vec<blogdesk_core::Contact>> {
        self.enter(Route::Contacts)?;
        let status: StatusFilter = filter.status.parse()?;

        let contacts = self
            .client
            .list_contacts()
            .await
            .map_err(|err| with_fallback(err, "Failed to load contacts"))?;
        Ok(filter_contacts(&contacts, status, &filter.search)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Contact list screen
    pub(crate) async fn list_contacts(mut self, filter: &ContactFilter, format: OutputFormat) -> Result<()> {
        let contacts = self.filtered_contacts(filter).await?;
        match format {
            OutputFormat::Json => println!("{}", output::json(&contacts)?),
            OutputFormat::Table => {
                self.header();
                print!("{}", output::contacts_table(&contacts.iter().collect::<Vec<_>>()));
            }
        }
        Ok(())
    }

    /// Contact list export button
    pub(crate) async fn export_contacts(mut self, filter: &ContactFilter, output: &Path) -> Result<()> {
        let contacts = self.filtered_contacts(filter).await?;
        if contacts.is_empty() {
            println!("Nothing to export");
            return Ok(());
        }
        let rows: Vec<_> = contacts.iter().collect();
        write_export(output, |writer| export::write_contacts(writer, &rows))
    }

    async fn filtered_calls(&mut self, search: &str) -> Result<Vec<blogdesk_core::ScheduledCall>> {
        self.enter(Route::ScheduledCalls)?;

        let calls = self
            .client
            .list_calls()
            .await
            .map_err(|err| with_fallback(err, "Failed to load scheduled calls"))?;
        Ok(filter_calls(&calls, search).into_iter().cloned().collect())
    }

    /// Scheduled call list screen
    pub(crate) async fn list_calls(mut self, search: &str, format: OutputFormat) -> Result<()> {
        let calls = self.filtered_calls(search).await?;
        match format {
            OutputFormat::Json => println!("{}", output::json(&calls)?),
            OutputFormat::Table => {
                self.header();
                print!("{}", output::calls_table(&calls.iter().collect::<Vec<_>>()));
            }
        }
        Ok(())
    }

    /// Scheduled call export button
    pub(crate) async fn export_calls(mut self, search: &str, output: &Path) -> Result<()> {
        let calls = self.filtered_calls(search).await?;
        if calls.is_empty() {
            println!("Nothing to export");
            return Ok(());
        }
        let rows: Vec<_> = calls.iter().collect();
        write_export(output, |writer| export::write_calls(writer, &rows))
    }

    /// Settings screen: create admin
    pub(crate) async fn create_admin(
        mut self,
        name: String,
        email: String,
        password: Option<String>,
    ) -> Result<()> {
        self.enter(Route::Settings)?;

        let password = match password {
            Some(password) => password,
            None => prompt::password("Password")?,
        };
        let request = CreateAdminRequest {
            name,
            email,
            password,
        };

        self.client
            .create_admin(&request)
            .await
            .map_err(|err| with_fallback(err, "Failed to create admin"))?;
        println!("Admin has been successfully created!");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_apply_edits() {
        let mut form = BlogForm::create();
        let edits = BlogEdits {
            title: Some("Hello".to_string()),
            custom_category: Some("Gardening".to_string()),
            add_tags: vec!["a".to_string(), "b".to_string(), "a".to_string()],
            remove_tags: vec!["missing".to_string()],
            ..BlogEdits::default()
        };
        apply_edits(&mut form, &edits).unwrap();

        assert_eq!(form.state().text(fields::TITLE), Some("Hello"));
        assert_eq!(form.state().list(fields::TAGS).unwrap(), ["a", "b"]);
        assert_eq!(
            form.state().selection(fields::CATEGORY).unwrap().effective(),
            "Gardening"
        );
    }

    #[test]
    fn test_apply_edits_rejects_unknown_preset() {
        let mut form = BlogForm::create();
        let edits = BlogEdits {
            category: Some("gardening".to_string()),
            ..BlogEdits::default()
        };
        assert!(matches!(
            apply_edits(&mut form, &edits),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_apply_edits_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        let mut form = BlogForm::create();
        let edits = BlogEdits {
            image: Some(path),
            ..BlogEdits::default()
        };
        let err = apply_edits(&mut form, &edits).unwrap_err();
        assert_eq!(err.user_message(), "Please select a valid image file");
    }

    #[test]
    fn test_report() {
        assert_eq!(report(SubmitOutcome::NoChange).unwrap(), "No changes to update");
        assert!(
            report(SubmitOutcome::Failed(SubmitFailure::Unauthorized))
                .unwrap_err()
                .requires_login()
        );
        assert_eq!(
            report(SubmitOutcome::Failed(SubmitFailure::Rejected {
                message: "Update failed!".to_string()
            }))
            .unwrap_err()
            .user_message(),
            "Update failed!"
        );
    }

    #[test]
    fn test_with_fallback() {
        let err = with_fallback(ClientError::Rejected { message: None }, "Failed to load blogs");
        assert_eq!(err.user_message(), "Failed to load blogs");

        let err = with_fallback(
            ClientError::Rejected {
                message: Some("Server says no".to_string()),
            },
            "Failed to load blogs",
        );
        assert_eq!(err.user_message(), "Server says no");
    }

    fn console(dir: &Path, collapsed: bool) -> Console {
        let mut config = Config::default();
        config.session.credential_path = Some(dir.join("credential.json"));
        Console::open(config, collapsed).unwrap()
    }

    #[test]
    fn test_collapsed_console_shows_only_selected_entry() {
        let dir = tempfile::tempdir().unwrap();
        assert!(console(dir.path(), false).shell.sidebar_open);

        let console = console(dir.path(), true);
        assert!(!console.shell.sidebar_open);
        assert_eq!(console.shell.render(), "[Dashboard]");
    }

    #[test]
    fn test_signed_out_console_redirects_private_screens() {
        let dir = tempfile::tempdir().unwrap();
        let mut console = console(dir.path(), false);

        assert!(console.enter(Route::Login).unwrap());
        assert!(console.enter(Route::Contacts).unwrap_err().requires_login());
    }

    #[test]
    fn test_write_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        write_export(&path, |writer| export::write_contacts(writer, &[])).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Sl No,Name,Email,Phone,Project,Date,Status\n"
        );
    }
}
