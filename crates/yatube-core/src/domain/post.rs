use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Group, User};
use crate::forms::ValidPost;

/// Number of characters shown when a post is referred to by a short label.
const LABEL_LEN: usize = 15;

/// Post entity - a single authored text entry, optionally tagged with a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
}

impl Post {
    /// Whether `user_id` is the recorded author of this post.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    /// Replace the editable fields. Author and publication date never change.
    pub fn apply_edit(&mut self, edit: ValidPost) {
        self.text = edit.text;
        self.group_id = edit.group_id;
    }

    /// The first few characters of the text, used as a page title.
    pub fn label(&self) -> String {
        self.text.chars().take(LABEL_LEN).collect()
    }
}

/// A post that has not been stored yet. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
}

impl NewPost {
    /// Stamp a validated submission with its author and publication time.
    pub fn new(author_id: Uuid, post: ValidPost) -> Self {
        Self {
            text: post.text,
            pub_date: Utc::now(),
            author_id,
            group_id: post.group_id,
        }
    }
}

/// Public view of a post's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// A post joined with its author and group, as listed on feed pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDetails {
    pub post: Post,
    pub author: Author,
    pub group: Option<Group>,
}

/// Which posts a feed lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    All,
    Group(i64),
    Author(Uuid),
}

impl PostScope {
    pub fn matches(&self, post: &Post) -> bool {
        match self {
            PostScope::All => true,
            PostScope::Group(group_id) => post.group_id == Some(*group_id),
            PostScope::Author(author_id) => post.author_id == *author_id,
        }
    }
}
