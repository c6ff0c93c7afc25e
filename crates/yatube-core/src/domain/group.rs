use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Longest title a group may carry.
pub const MAX_TITLE_LEN: usize = 200;

/// Longest slug a group may carry.
pub const MAX_SLUG_LEN: usize = 50;

/// Group entity - a named category posts may belong to.
///
/// Groups are identified by their slug in URLs; the numeric id is what posts reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

/// A group that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl NewGroup {
    /// Build a new group, rejecting empty titles and malformed slugs.
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into().trim().to_string();
        let slug = slug.into();

        if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "Group title must be between 1 and {MAX_TITLE_LEN} characters"
            )));
        }
        validate_slug(&slug)?;

        Ok(Self {
            title,
            slug,
            description: description.into(),
        })
    }
}

/// Check that a slug is URL-safe: ASCII letters, digits, hyphens and underscores.
pub fn validate_slug(slug: &str) -> Result<(), DomainError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return Err(DomainError::Validation(format!(
            "Slug must be between 1 and {MAX_SLUG_LEN} characters"
        )));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DomainError::Validation(
            "Slug may only contain letters, numbers, underscores or hyphens".to_string(),
        ));
    }

    Ok(())
}
