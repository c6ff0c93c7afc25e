//! Domain entities - the core business objects.

mod group;
mod post;
mod user;

pub use group::{Group, NewGroup, validate_slug};
pub use post::{Author, NewPost, Post, PostDetails, PostScope};
pub use user::{User, validate_username};
