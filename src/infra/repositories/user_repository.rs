//! User repository implementation.
//!
//! Queries take any `ConnectionTrait` so a transaction can run them too.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{IdentityFields, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by exact username
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a new user with empty personal fields
    async fn create(&self, username: String, password_hash: String) -> AppResult<User>;

    /// Overwrite first name, last name and email
    async fn update_identity(&self, id: Uuid, identity: IdentityFields) -> AppResult<User>;
}

pub(crate) async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<User>> {
    let result = UserEntity::find_by_id(id).one(db).await?;
    Ok(result.map(User::from))
}

pub(crate) async fn find_user_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> AppResult<Option<User>> {
    let result = UserEntity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?;
    Ok(result.map(User::from))
}

pub(crate) async fn insert_user<C: ConnectionTrait>(
    db: &C,
    username: String,
    password_hash: String,
) -> AppResult<User> {
    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        password_hash: Set(password_hash),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        email: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = active_model.insert(db).await?;
    Ok(User::from(model))
}

pub(crate) async fn update_user_identity<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    identity: IdentityFields,
) -> AppResult<User> {
    let user = UserEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = user.into();
    active.first_name = Set(identity.first_name);
    active.last_name = Set(identity.last_name);
    active.email = Set(identity.email);
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(db).await?;
    Ok(User::from(model))
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_user(&self.db, id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        find_user_by_username(&self.db, username).await
    }

    async fn create(&self, username: String, password_hash: String) -> AppResult<User> {
        insert_user(&self.db, username, password_hash).await
    }

    async fn update_identity(&self, id: Uuid, identity: IdentityFields) -> AppResult<User> {
        update_user_identity(&self.db, id, identity).await
    }
}
