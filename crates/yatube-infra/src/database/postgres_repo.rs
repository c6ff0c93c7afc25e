//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use yatube_core::domain::{
    Author, Group, NewGroup, NewPost, Post, PostDetails, PostScope, User,
};
use yatube_core::error::RepoError;
use yatube_core::pagination::PageWindow;
use yatube_core::ports::{GroupRepository, PostRepository, UserRepository};

use super::entity::group::{self, Entity as GroupEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL group repository.
pub type PostgresGroupRepository = PostgresBaseRepository<GroupEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(user)
            .insert(&self.db)
            .await
            .map_err(write_error)?;

        tracing::info!(user_id = %model.id, username = %model.username, "User created");
        Ok(model.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError> {
        let model = group::ActiveModel::from(group)
            .insert(&self.db)
            .await
            .map_err(write_error)?;

        tracing::info!(group_id = model.id, slug = %model.slug, "Group created");
        Ok(model.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let result = GroupEntity::find()
            .filter(group::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let result = GroupEntity::find()
            .order_by_asc(group::Column::Title)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

fn scope_condition(scope: PostScope) -> Condition {
    match scope {
        PostScope::All => Condition::all(),
        PostScope::Group(group_id) => Condition::all().add(post::Column::GroupId.eq(group_id)),
        PostScope::Author(author_id) => Condition::all().add(post::Column::AuthorId.eq(author_id)),
    }
}

fn dangling_author(post_id: i64) -> RepoError {
    RepoError::Query(format!("post {post_id} references a missing author"))
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post)
            .insert(&self.db)
            .await
            .map_err(write_error)?;

        tracing::info!(post_id = model.id, author_id = %model.author_id, "Post created");
        Ok(model.into())
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post)
            .update(&self.db)
            .await
            .map_err(write_error)?;

        Ok(model.into())
    }

    async fn find_details(&self, id: i64) -> Result<Option<PostDetails>, RepoError> {
        let Some(post) = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_error)?
        else {
            return Ok(None);
        };

        let author = UserEntity::find_by_id(post.author_id)
            .one(&self.db)
            .await
            .map_err(query_error)?
            .ok_or_else(|| dangling_author(post.id))?;

        let group = match post.group_id {
            Some(group_id) => GroupEntity::find_by_id(group_id)
                .one(&self.db)
                .await
                .map_err(query_error)?,
            None => None,
        };

        Ok(Some(PostDetails {
            author: Author::from(&author),
            group: group.map(Into::into),
            post: post.into(),
        }))
    }

    async fn count(&self, scope: PostScope) -> Result<u64, RepoError> {
        PostEntity::find()
            .filter(scope_condition(scope))
            .count(&self.db)
            .await
            .map_err(query_error)
    }

    async fn list(
        &self,
        scope: PostScope,
        window: PageWindow,
    ) -> Result<Vec<PostDetails>, RepoError> {
        let rows = PostEntity::find()
            .filter(scope_condition(scope))
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
            .offset(window.offset)
            .limit(window.limit)
            .find_also_related(GroupEntity)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        let mut author_ids: Vec<Uuid> = rows.iter().map(|(p, _)| p.author_id).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<Uuid, Author> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(query_error)?
            .iter()
            .map(|u| (u.id, Author::from(u)))
            .collect();

        rows.into_iter()
            .map(|(post, group)| {
                let author = authors
                    .get(&post.author_id)
                    .cloned()
                    .ok_or_else(|| dangling_author(post.id))?;
                Ok(PostDetails {
                    author,
                    group: group.map(Into::into),
                    post: post.into(),
                })
            })
            .collect()
    }
}
