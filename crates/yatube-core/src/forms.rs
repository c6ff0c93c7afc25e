//! Post form validation.
//!
//! [`PostForm`] holds the values exactly as submitted so a rejected form can be
//! re-rendered with the user's input intact. [`PostForm::validate`] is a pure
//! function of the form and the group choices offered to the user.

use serde::{Deserialize, Serialize};

use crate::domain::{Group, Post};

pub const EMPTY_TEXT_MESSAGE: &str = "Looks like you still need to write something.";
pub const INVALID_GROUP_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Raw post form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    /// Group id as submitted; empty means "no group".
    #[serde(default)]
    pub group: String,
}

/// A post submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPost {
    pub text: String,
    pub group_id: Option<i64>,
}

/// Field-level validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub text: Vec<String>,
    pub group: Vec<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.group.is_empty()
    }
}

impl PostForm {
    pub fn new(text: impl Into<String>, group_id: Option<i64>) -> Self {
        Self {
            text: text.into(),
            group: group_id.map(|id| id.to_string()).unwrap_or_default(),
        }
    }

    /// Pre-fill the form with a stored post's current values.
    pub fn from_post(post: &Post) -> Self {
        Self::new(post.text.clone(), post.group_id)
    }

    /// Validate the submission against the available groups.
    ///
    /// Every field is checked so all problems are reported at once.
    pub fn validate(&self, choices: &[Group]) -> Result<ValidPost, FormErrors> {
        let mut errors = FormErrors::default();

        let text = self.text.trim();
        if text.is_empty() {
            errors.text.push(EMPTY_TEXT_MESSAGE.to_string());
        }

        let group_id = match self.group.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(id) if choices.iter().any(|group| group.id == id) => Some(id),
                _ => {
                    errors.group.push(INVALID_GROUP_MESSAGE.to_string());
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidPost {
            text: text.to_string(),
            group_id,
        })
    }
}
