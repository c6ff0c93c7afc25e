use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Group, NewGroup, NewPost, Post, PostDetails, PostScope, User};
use crate::error::RepoError;
use crate::pagination::PageWindow;

/// Generic repository trait shared by every stored record.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Store a new user. Usernames are unique.
    async fn create(&self, user: User) -> Result<User, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    /// Store a new group. Slugs are unique.
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// All groups ordered by title, used as form choices.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;
}

/// Post repository.
///
/// Listings are always newest first by publication date, ties broken by id.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    /// Store a new post and return it with its assigned id.
    ///
    /// A missing author or group is a `RepoError::Constraint`.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Write the editable fields (text and group) of an existing post.
    ///
    /// Returns `RepoError::NotFound` when no row has the post's id.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// A single post joined with its author and group.
    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, RepoError>;

    /// Number of posts in a scope.
    async fn count(&self, scope: PostScope) -> Result<u64, RepoError>;

    /// One page of posts in a scope.
    async fn list(&self, scope: PostScope, window: PageWindow)
    -> Result<Vec<PostDetails>, RepoError>;
}
