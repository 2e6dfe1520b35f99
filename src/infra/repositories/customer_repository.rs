//! Customer profile repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use uuid::Uuid;

use super::entities::customer::{self, ActiveModel, Entity as CustomerEntity};
use crate::domain::{Customer, CustomerProfile};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// At most one customer row exists per user.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Find the customer profile owned by a user
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Customer>>;

    /// Create the user's profile, or overwrite it if one exists
    async fn upsert(&self, user_id: Uuid, profile: CustomerProfile) -> AppResult<Customer>;
}

pub(crate) async fn find_customer_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> AppResult<Option<Customer>> {
    let result = CustomerEntity::find()
        .filter(customer::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(AppError::from)?;

    Ok(result.map(Customer::from))
}

pub(crate) async fn upsert_customer<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    profile: CustomerProfile,
) -> AppResult<Customer> {
    let existing = CustomerEntity::find()
        .filter(customer::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    let model = match existing {
        Some(model) => {
            let mut active: ActiveModel = model.into();
            active.document_id = Set(profile.document_id);
            active.gender = Set(profile.gender.code().to_string());
            active.phone = Set(profile.phone);
            active.birthdate = Set(profile.birthdate);
            active.address = Set(profile.address);
            active.update(db).await?
        }
        None => {
            tracing::debug!(%user_id, "Creating customer profile");
            ActiveModel {
                document_id: Set(profile.document_id),
                gender: Set(profile.gender.code().to_string()),
                phone: Set(profile.phone),
                birthdate: Set(profile.birthdate),
                address: Set(profile.address),
                user_id: Set(user_id),
                ..Default::default()
            }
            .insert(db)
            .await?
        }
    };

    Ok(Customer::from(model))
}

pub struct CustomerStore {
    db: DatabaseConnection,
}

impl CustomerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerRepository for CustomerStore {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<Customer>> {
        find_customer_by_user(&self.db, user_id).await
    }

    async fn upsert(&self, user_id: Uuid, profile: CustomerProfile) -> AppResult<Customer> {
        upsert_customer(&self.db, user_id, profile).await
    }
}
