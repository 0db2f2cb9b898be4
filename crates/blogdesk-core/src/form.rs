//! Create/edit form reconciliation
//!
//! A [`ResourceFormReconciler`] owns the values of one resource form and a baseline snapshot
//! of what the server last persisted. Submitting in create mode sends every field; in edit
//! mode only the fields whose [`FieldKind`] predicate reports a change are sent, and an edit
//! with nothing changed never reaches the network.
//!
//! The reconciler is generic over the [`Resource`] being edited and the [`ResourceBackend`]
//! that persists it.

use crate::error::{Error, Result};
use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use std::marker::PhantomData;
use std::path::Path;
use tracing::{debug, info, warn};

/// Name of the ordered tag list field
pub const TAGS: &str = "tags";

/// Fallback shown when a create fails without a server message
pub const CREATE_FAILED: &str = "Something went wrong!";

/// Fallback shown when an update fails without a server message
pub const UPDATE_FAILED: &str = "Update failed!";

/// Shape of a form field; each kind has its own notion of "changed"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single text value, compared by value
    Scalar,
    /// Ordered list without duplicates, compared as a sequence
    List,
    /// Optional file upload; changed only when a new file is staged
    Binary,
    /// Selection with a free-text "other" mode, compared as a whole
    Auxiliary,
}

impl FieldKind {
    /// Value a fresh form starts with
    #[must_use]
    pub const fn empty(self) -> FieldValue {
        match self {
            Self::Scalar => FieldValue::Text(String::new()),
            Self::List => FieldValue::List(Vec::new()),
            Self::Binary => FieldValue::Binary(None),
            Self::Auxiliary => FieldValue::Choice(Selection::unset()),
        }
    }

    /// Whether `current` counts as a change from `baseline`
    #[must_use]
    pub fn changed(self, current: &FieldValue, baseline: &FieldValue) -> bool {
        match self {
            // A stored image is never loaded into the form, so only a fresh file counts.
            Self::Binary => matches!(current, FieldValue::Binary(Some(_))),
            Self::Scalar | Self::List | Self::Auxiliary => current != baseline,
        }
    }

    const fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (Self::Scalar, FieldValue::Text(_))
                | (Self::List, FieldValue::List(_))
                | (Self::Binary, FieldValue::Binary(_))
                | (Self::Auxiliary, FieldValue::Choice(_))
        )
    }
}

/// One entry of a form schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire name of the field
    pub name: &'static str,
    /// How the field is compared and encoded
    pub kind: FieldKind,
    /// Must be non-empty before submission
    pub required: bool,
}

impl FieldSpec {
    /// Optional field of `kind`
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }

    /// Same field, marked required
    #[must_use]
    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }
}

/// Ordered field table of a resource form
pub type FormSchema = &'static [FieldSpec];

/// A file picked for upload during this editing session
#[derive(Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Original file name
    pub file_name: String,
    /// MIME type guessed from the file name
    pub content_type: String,
    /// File contents
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for StagedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl StagedFile {
    /// Stage an image; anything whose name does not map to an `image/*` type is refused
    ///
    /// # Errors
    ///
    /// Returns a validation error for non-image files.
    pub fn image(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name).first();
        match mime {
            Some(mime) if mime.type_() == mime_guess::mime::IMAGE => Ok(Self {
                file_name,
                content_type: mime.essence_str().to_string(),
                bytes,
            }),
            _ => Err(Error::validation("image", "Please select a valid image file")),
        }
    }

    /// Read and stage the image at `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not an image.
    pub fn read_image(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::validation("image", "Please select a valid image file"))?
            .to_string();
        // Check the type before reading a possibly large file.
        Self::image(file_name.clone(), Vec::new())?;
        let bytes = std::fs::read(path)?;
        Self::image(file_name, bytes)
    }
}

/// Which option of a selection is active
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice {
    /// Nothing selected
    #[default]
    Unset,
    /// One of the predefined options
    Preset(String),
    /// Free text entered by the user
    Other,
}

/// Selection sub-state: the chosen option plus the free text used by [`Choice::Other`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Active option
    pub choice: Choice,
    /// Free text, meaningful only for [`Choice::Other`]
    pub custom: String,
}

impl Selection {
    /// Nothing selected
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            choice: Choice::Unset,
            custom: String::new(),
        }
    }

    /// A predefined option
    #[must_use]
    pub fn preset(value: impl Into<String>) -> Self {
        Self {
            choice: Choice::Preset(value.into()),
            custom: String::new(),
        }
    }

    /// Free text
    #[must_use]
    pub fn other(custom: impl Into<String>) -> Self {
        Self {
            choice: Choice::Other,
            custom: custom.into(),
        }
    }

    /// Classify a stored value against the known `presets`
    #[must_use]
    pub fn from_value(value: &str, presets: &[&str]) -> Self {
        if value.is_empty() {
            Self::unset()
        } else if presets.contains(&value) {
            Self::preset(value)
        } else {
            Self::other(value)
        }
    }

    /// The value that is submitted
    #[must_use]
    pub fn effective(&self) -> &str {
        match &self.choice {
            Choice::Unset => "",
            Choice::Preset(value) => value,
            Choice::Other => &self.custom,
        }
    }
}

/// Current value of a form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// [`FieldKind::Scalar`] value
    Text(String),
    /// [`FieldKind::List`] value
    List(Vec<String>),
    /// [`FieldKind::Binary`] value; `None` until a file is staged
    Binary(Option<StagedFile>),
    /// [`FieldKind::Auxiliary`] value
    Choice(Selection),
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Binary(file) => file.is_none(),
            Self::Choice(selection) => selection.effective().trim().is_empty(),
        }
    }

    fn encode(&self) -> Option<PayloadValue> {
        match self {
            Self::Text(text) => Some(PayloadValue::Text(text.clone())),
            // The API expects the tag list as a JSON-encoded string.
            Self::List(items) => Some(PayloadValue::Text(
                serde_json::Value::from(items.clone()).to_string(),
            )),
            Self::Binary(file) => file.clone().map(PayloadValue::File),
            Self::Choice(selection) => Some(PayloadValue::Text(selection.effective().to_string())),
        }
    }
}

/// Field name to current value, in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: IndexMap<&'static str, FieldValue>,
}

impl FormState {
    /// Every field of `schema` at its empty value
    #[must_use]
    pub fn empty(schema: FormSchema) -> Self {
        Self {
            values: schema
                .iter()
                .map(|spec| (spec.name, spec.kind.empty()))
                .collect(),
        }
    }

    /// Replace the value of an existing field; unknown names are ignored
    #[must_use]
    pub fn with(mut self, name: &str, value: FieldValue) -> Self {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        }
        self
    }

    /// Value of `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Text of a scalar field
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FieldValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Items of a list field
    #[must_use]
    pub fn list(&self, name: &str) -> Option<&[String]> {
        match self.values.get(name) {
            Some(FieldValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Sub-state of an auxiliary field
    #[must_use]
    pub fn selection(&self, name: &str) -> Option<&Selection> {
        match self.values.get(name) {
            Some(FieldValue::Choice(selection)) => Some(selection),
            _ => None,
        }
    }

    /// File staged on a binary field
    #[must_use]
    pub fn staged(&self, name: &str) -> Option<&StagedFile> {
        match self.values.get(name) {
            Some(FieldValue::Binary(file)) => file.as_ref(),
            _ => None,
        }
    }

    /// Fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (*name, value))
    }

    fn list_mut(&mut self, name: &str) -> Option<&mut Vec<String>> {
        match self.values.get_mut(name) {
            Some(FieldValue::List(items)) => Some(items),
            _ => None,
        }
    }

    fn selection_mut(&mut self, name: &str) -> Option<&mut Selection> {
        match self.values.get_mut(name) {
            Some(FieldValue::Choice(selection)) => Some(selection),
            _ => None,
        }
    }

    fn unstage_files(&mut self) {
        for value in self.values.values_mut() {
            if let FieldValue::Binary(file) = value {
                file.take();
            }
        }
    }
}

/// One multipart value of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadValue {
    /// Text part
    Text(String),
    /// File part
    File(StagedFile),
}

/// Fields sent with a create or update request, in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    parts: Vec<(&'static str, PayloadValue)>,
}

impl FormPayload {
    /// Parts in order
    #[must_use]
    pub fn parts(&self) -> &[(&'static str, PayloadValue)] {
        &self.parts
    }

    /// Consume into parts
    #[must_use]
    pub fn into_parts(self) -> Vec<(&'static str, PayloadValue)> {
        self.parts
    }

    /// Field names in order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.parts.iter().map(|(name, _)| *name).collect()
    }

    /// Text part named `name`
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|(part, value)| match value {
            PayloadValue::Text(text) if *part == name => Some(text.as_str()),
            _ => None,
        })
    }

    /// File part named `name`
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&StagedFile> {
        self.parts.iter().find_map(|(part, value)| match value {
            PayloadValue::File(file) if *part == name => Some(file),
            _ => None,
        })
    }

    /// Whether nothing would be sent
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn from_state<'a>(state: &FormState, names: impl IntoIterator<Item = &'a str>) -> Self {
        let parts = names
            .into_iter()
            .filter_map(|name| {
                let (name, value) = state.values.get_key_value(name)?;
                value.encode().map(|encoded| (*name, encoded))
            })
            .collect();
        Self { parts }
    }
}

/// A server-managed record that can be edited through a form
pub trait Resource: Send + Sync + 'static {
    /// Display name used in messages, e.g. "Blog"
    const KIND: &'static str;

    /// Field table of the form
    const SCHEMA: FormSchema;

    /// Form values representing this record
    fn to_form(&self) -> FormState;

    /// Reference to an already stored attachment, shown but never resubmitted
    fn attachment(&self) -> Option<&str> {
        None
    }
}

/// Persistence for a [`Resource`]
#[async_trait]
pub trait ResourceBackend<R: Resource>: Send + Sync {
    /// Fetch one record; a missing record is [`Error::NotFound`]
    async fn fetch(&self, id: &str) -> Result<R>;

    /// Create a record from every field of the form
    async fn create(&self, payload: FormPayload) -> Result<()>;

    /// Update the changed fields of record `id`
    async fn update(&self, id: &str, payload: FormPayload) -> Result<()>;
}

/// Whether the form creates a new record or edits an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// No record yet; every field is sent
    Create,
    /// Editing the record with this id; only changes are sent
    Edit {
        /// Record id
        id: String,
    },
}

/// Why a submission did not go through
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitFailure {
    /// A required field is empty; nothing was sent
    Validation {
        /// Offending field
        field: String,
        /// Message for the user
        message: String,
    },
    /// The credential is missing, expired or was rejected; the caller should go to login
    Unauthorized,
    /// The server refused the request or could not be reached
    Rejected {
        /// Server message or a per-action fallback
        message: String,
    },
}

impl SubmitFailure {
    /// Message for the user
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Validation { message, .. } | Self::Rejected { message } => message.clone(),
            Self::Unauthorized => "Please log in.".to_string(),
        }
    }

    fn from_error(err: &Error, fallback: &str) -> Self {
        match err {
            Error::Authentication(_) => Self::Unauthorized,
            Error::Validation { field, message } => Self::Validation {
                field: field.clone(),
                message: message.clone(),
            },
            other => Self::Rejected {
                message: other.message_or(fallback),
            },
        }
    }
}

/// Result of [`ResourceFormReconciler::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Create request accepted
    Created,
    /// Update request accepted; the baseline now matches the form
    Updated,
    /// Edit mode with nothing changed; informational, no request was sent
    NoChange,
    /// Nothing was persisted
    Failed(SubmitFailure),
}

/// Form values and their last-persisted baseline for one resource
#[derive(Debug, Clone)]
pub struct ResourceFormReconciler<R> {
    mode: FormMode,
    state: FormState,
    baseline: FormState,
    attachment: Option<String>,
    resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Default for ResourceFormReconciler<R> {
    fn default() -> Self {
        Self::create()
    }
}

impl<R: Resource> ResourceFormReconciler<R> {
    /// Empty form in create mode; the baseline is the empty form
    #[must_use]
    pub fn create() -> Self {
        let empty = FormState::empty(R::SCHEMA);
        Self {
            mode: FormMode::Create,
            state: empty.clone(),
            baseline: empty,
            attachment: None,
            resource: PhantomData,
        }
    }

    /// Form in edit mode for an already fetched record
    #[must_use]
    pub fn edit(id: impl Into<String>, resource: &R) -> Self {
        let values = resource.to_form();
        Self {
            mode: FormMode::Edit { id: id.into() },
            state: values.clone(),
            baseline: values,
            attachment: resource.attachment().map(str::to_string),
            resource: PhantomData,
        }
    }

    /// Create mode without `id`; otherwise fetch the record and edit it
    ///
    /// A failed fetch yields no form at all.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing record, [`Error::Authentication`] when the
    /// backend rejects the credential, and a network error for any other fetch failure.
    pub async fn load<B>(backend: &B, id: Option<&str>) -> Result<Self>
    where
        B: ResourceBackend<R> + ?Sized,
    {
        let Some(id) = id else {
            debug!(kind = R::KIND, "Opening empty form");
            return Ok(Self::create());
        };

        match backend.fetch(id).await {
            Ok(resource) => {
                debug!(kind = R::KIND, id, "Loaded record into form");
                Ok(Self::edit(id, &resource))
            }
            Err(Error::NotFound { .. }) => {
                warn!(kind = R::KIND, id, "Record not found");
                Err(Error::NotFound {
                    resource: R::KIND.to_string(),
                })
            }
            Err(err) if err.requires_login() => Err(err),
            Err(err) => {
                warn!(kind = R::KIND, id, error = %err, "Failed to load record");
                Err(Error::network(format!(
                    "Failed to load {} data",
                    R::KIND.to_lowercase()
                )))
            }
        }
    }

    /// Create or edit
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Current values
    pub const fn state(&self) -> &FormState {
        &self.state
    }

    /// Last persisted values
    pub const fn baseline(&self) -> &FormState {
        &self.baseline
    }

    /// Stored attachment reference of the loaded record
    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    fn spec(name: &str) -> Result<&'static FieldSpec> {
        R::SCHEMA
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| Error::validation(name, format!("unknown {} field", R::KIND)))
    }

    /// Replace the value of `name`; the baseline is untouched
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown fields or a value of the wrong kind.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
        let spec = Self::spec(name)?;
        if !spec.kind.accepts(&value) {
            return Err(Error::validation(
                name,
                format!("expected a {:?} value", spec.kind),
            ));
        }
        if let Some(slot) = self.state.values.get_mut(name) {
            *slot = value;
        }
        Ok(())
    }

    /// Set a scalar field
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` is not a scalar field.
    pub fn set_text(&mut self, name: &str, text: impl Into<String>) -> Result<()> {
        self.set_field(name, FieldValue::Text(text.into()))
    }

    /// Append `item` to list `name` if it is non-empty after trimming and not yet present
    ///
    /// Returns whether the list changed.
    pub fn add_item(&mut self, name: &str, item: &str) -> bool {
        let item = item.trim();
        match self.state.list_mut(name) {
            Some(items) if !item.is_empty() && !items.iter().any(|existing| existing == item) => {
                items.push(item.to_string());
                true
            }
            _ => false,
        }
    }

    /// Remove the first exact match of `item` from list `name`
    ///
    /// Returns whether the list changed.
    pub fn remove_item(&mut self, name: &str, item: &str) -> bool {
        let Some(items) = self.state.list_mut(name) else {
            return false;
        };
        match items.iter().position(|existing| existing == item) {
            Some(index) => {
                items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Add a tag; duplicates (exact, case-sensitive) and blank tags are ignored
    pub fn add_tag(&mut self, tag: &str) -> bool {
        self.add_item(TAGS, tag)
    }

    /// Remove a tag; absent tags are ignored
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.remove_item(TAGS, tag)
    }

    /// Stage a file on binary field `name`
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` is not a binary field.
    pub fn stage_file(&mut self, name: &str, file: StagedFile) -> Result<()> {
        self.set_field(name, FieldValue::Binary(Some(file)))
    }

    /// Pick an option of auxiliary field `name`; the free text is cleared
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` is not an auxiliary field.
    pub fn select(&mut self, name: &str, choice: Choice) -> Result<()> {
        let selection = self
            .state
            .selection_mut(name)
            .ok_or_else(|| Error::validation(name, "not a selection field"))?;
        selection.choice = choice;
        selection.custom.clear();
        Ok(())
    }

    /// Enter free text on auxiliary field `name`, switching it to [`Choice::Other`]
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` is not an auxiliary field.
    pub fn set_custom(&mut self, name: &str, text: impl Into<String>) -> Result<()> {
        let selection = self
            .state
            .selection_mut(name)
            .ok_or_else(|| Error::validation(name, "not a selection field"))?;
        selection.choice = Choice::Other;
        selection.custom = text.into();
        Ok(())
    }

    /// Names of the fields that differ from the baseline, in schema order
    #[must_use]
    pub fn diff(&self) -> IndexSet<&'static str> {
        R::SCHEMA
            .iter()
            .filter(|spec| match (self.state.get(spec.name), self.baseline.get(spec.name)) {
                (Some(current), Some(baseline)) => spec.kind.changed(current, baseline),
                _ => false,
            })
            .map(|spec| spec.name)
            .collect()
    }

    /// Check required fields
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first required field left empty.
    pub fn validate(&self) -> Result<()> {
        for spec in R::SCHEMA.iter().filter(|spec| spec.required) {
            if self.state.get(spec.name).is_none_or(FieldValue::is_blank) {
                return Err(Error::validation(spec.name, format!("{} is required", spec.name)));
            }
        }
        Ok(())
    }

    /// What a submission would send right now
    #[must_use]
    pub fn payload(&self) -> FormPayload {
        match self.mode {
            FormMode::Create => {
                FormPayload::from_state(&self.state, R::SCHEMA.iter().map(|spec| spec.name))
            }
            FormMode::Edit { .. } => FormPayload::from_state(&self.state, self.diff()),
        }
    }

    /// Persist the form
    ///
    /// Taking `&mut self` keeps a second submission from starting while one is pending.
    /// After a successful update the baseline becomes the submitted values and staged files
    /// are released; after a failure both the baseline and the edits are kept.
    pub async fn submit<B>(&mut self, backend: &B) -> SubmitOutcome
    where
        B: ResourceBackend<R> + ?Sized,
    {
        match &self.mode {
            FormMode::Create => {
                if let Err(err) = self.validate() {
                    debug!(kind = R::KIND, error = %err, "Submission blocked by validation");
                    return SubmitOutcome::Failed(SubmitFailure::from_error(&err, CREATE_FAILED));
                }

                let payload = self.payload();
                match backend.create(payload).await {
                    Ok(()) => {
                        info!(kind = R::KIND, "Record created");
                        SubmitOutcome::Created
                    }
                    Err(err) => {
                        warn!(kind = R::KIND, error = %err, "Create failed");
                        SubmitOutcome::Failed(SubmitFailure::from_error(&err, CREATE_FAILED))
                    }
                }
            }
            FormMode::Edit { id } => {
                let changed = self.diff();
                if changed.is_empty() {
                    info!(kind = R::KIND, id = %id, "No changes to update");
                    return SubmitOutcome::NoChange;
                }
                if let Err(err) = self.validate() {
                    debug!(kind = R::KIND, id = %id, error = %err, "Submission blocked by validation");
                    return SubmitOutcome::Failed(SubmitFailure::from_error(&err, UPDATE_FAILED));
                }

                let payload = FormPayload::from_state(&self.state, changed.iter().copied());
                debug!(kind = R::KIND, id = %id, fields = ?payload.names(), "Submitting changes");
                match backend.update(id, payload).await {
                    Ok(()) => {
                        info!(kind = R::KIND, id = %id, "Record updated");
                        self.state.unstage_files();
                        self.baseline = self.state.clone();
                        SubmitOutcome::Updated
                    }
                    Err(err) => {
                        warn!(kind = R::KIND, id = %id, error = %err, "Update failed");
                        SubmitOutcome::Failed(SubmitFailure::from_error(&err, UPDATE_FAILED))
                    }
                }
            }
        }
    }
}
