//! The blog resource as seen by the create/edit form

use crate::form::{
    FieldKind, FieldSpec, FieldValue, FormSchema, FormState, Resource, ResourceFormReconciler,
    Selection,
};
use crate::types::Blog;

/// Field names of the blog form
pub mod fields {
    /// Post title
    pub const TITLE: &str = "title";
    /// Listing teaser
    pub const SHORT_DESCRIPTION: &str = "shortDescription";
    /// Category selection
    pub const CATEGORY: &str = "category";
    /// Author name
    pub const AUTHOR: &str = "author";
    /// Tag list
    pub const TAGS: &str = crate::form::TAGS;
    /// Cover image upload
    pub const IMAGE: &str = "image";
    /// Body
    pub const DESCRIPTION: &str = "description";
}

/// Predefined categories as `(slug, label)`
pub const CATEGORY_PRESETS: &[(&str, &str)] = &[
    ("customSoftwareDevelopment", "Custom Software Development"),
    ("mobileAppDevelopment", "Mobile App Development"),
    ("webDevelopment", "Web Development"),
    ("crmSoftware", "CRM Software Development"),
    ("digitalMarketing", "Digital Marketing"),
    ("seoServices", "SEO Services"),
    ("leadHandlerSolutions", "Lead Handler Solutions"),
    ("brandIdentityDesign", "Brand Identity Design"),
];

/// Slugs of [`CATEGORY_PRESETS`]
#[must_use]
pub fn category_slugs() -> Vec<&'static str> {
    CATEGORY_PRESETS.iter().map(|(slug, _)| *slug).collect()
}

/// Human label of a category slug, or the value itself for custom categories
#[must_use]
pub fn category_label(value: &str) -> &str {
    CATEGORY_PRESETS
        .iter()
        .find(|(slug, _)| *slug == value)
        .map_or(value, |(_, label)| label)
}

/// Classify a stored category
#[must_use]
pub fn category_selection(value: &str) -> Selection {
    Selection::from_value(value, &category_slugs())
}

/// Blog create/edit form
pub type BlogForm = ResourceFormReconciler<Blog>;

impl Resource for Blog {
    const KIND: &'static str = "Blog";

    const SCHEMA: FormSchema = &[
        FieldSpec::new(fields::TITLE, FieldKind::Scalar).required(),
        FieldSpec::new(fields::SHORT_DESCRIPTION, FieldKind::Scalar).required(),
        FieldSpec::new(fields::CATEGORY, FieldKind::Auxiliary),
        FieldSpec::new(fields::AUTHOR, FieldKind::Scalar),
        FieldSpec::new(fields::TAGS, FieldKind::List),
        FieldSpec::new(fields::IMAGE, FieldKind::Binary),
        FieldSpec::new(fields::DESCRIPTION, FieldKind::Scalar),
    ];

    fn to_form(&self) -> FormState {
        FormState::empty(Self::SCHEMA)
            .with(fields::TITLE, FieldValue::Text(self.title.clone()))
            .with(
                fields::SHORT_DESCRIPTION,
                FieldValue::Text(self.short_description.clone()),
            )
            .with(
                fields::CATEGORY,
                FieldValue::Choice(category_selection(&self.category)),
            )
            .with(fields::AUTHOR, FieldValue::Text(self.author.clone()))
            .with(fields::TAGS, FieldValue::List(self.tags.clone()))
            .with(fields::DESCRIPTION, FieldValue::Text(self.description.clone()))
    }

    fn attachment(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::form::Choice;
    use pretty_assertions::assert_eq;

    fn sample() -> Blog {
        Blog {
            id: "123".to_string(),
            title: "A".to_string(),
            category: "Gardening".to_string(),
            tags: vec!["x".to_string()],
            image: Some("https://cdn.example.com/a.png".to_string()),
            ..Blog::default()
        }
    }

    #[test]
    fn test_schema_order() {
        let names: Vec<_> = Blog::SCHEMA.iter().map(|spec| spec.name).collect();
        assert_eq!(
            names,
            vec![
                "title",
                "shortDescription",
                "category",
                "author",
                "tags",
                "image",
                "description"
            ]
        );
    }

    #[test]
    fn test_to_form_never_carries_stored_image() {
        let blog = sample();
        let form = blog.to_form();
        assert!(form.staged(fields::IMAGE).is_none());
        assert_eq!(blog.attachment(), Some("https://cdn.example.com/a.png"));
    }

    #[test]
    fn test_custom_category_loads_as_other() {
        let form = sample().to_form();
        let selection = form.selection(fields::CATEGORY).unwrap();
        assert_eq!(selection.choice, Choice::Other);
        assert_eq!(selection.effective(), "Gardening");
    }

    #[test]
    fn test_category_label() {
        assert_eq!(category_label("crmSoftware"), "CRM Software Development");
        assert_eq!(category_label("Gardening"), "Gardening");
        assert_eq!(
            category_selection("seoServices").choice,
            Choice::Preset("seoServices".to_string())
        );
    }
}
