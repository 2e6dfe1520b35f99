//! Account service - Identity creation, login and the customer profile.
//!
//! Passwords go through the domain `Password` value object. Session binding
//! happens on the explicit `Session` handed in by the caller.

use async_trait::async_trait;
use sea_orm::SqlErr;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::MAX_USERNAME_LENGTH;
use crate::domain::password::DUMMY_HASH;
use crate::domain::{AccountForm, AccountView, Password, Session, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::with_transaction;

#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an identity and log it into `session`
    async fn create_account(
        &self,
        session: &mut Session,
        username: String,
        password: String,
    ) -> AppResult<User>;

    /// Check credentials and log the identity into `session`
    async fn login(&self, session: &mut Session, username: String, password: String)
        -> AppResult<User>;

    /// Forget the identity and everything else held by `session`
    fn logout(&self, session: &mut Session);

    /// Identity fields, merged with the customer profile once one exists
    async fn account(&self, user_id: Uuid) -> AppResult<AccountView>;

    /// Write the identity fields and create or update the customer profile
    async fn update_account(&self, user_id: Uuid, form: AccountForm) -> AppResult<AccountView>;
}

pub struct AccountManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AccountManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn validate_username(username: &str) -> AppResult<()> {
    if username.trim().is_empty() {
        return Err(AppError::validation("Username is required"));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AppError::validation(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> AccountService for AccountManager<U> {
    async fn create_account(
        &self,
        session: &mut Session,
        username: String,
        password: String,
    ) -> AppResult<User> {
        validate_username(&username)?;
        let password_hash = Password::new(&password)?.into_string();

        let users = self.uow.users();
        if users.find_by_username(&username).await?.is_some() {
            tracing::info!(%username, "Username already taken");
            return Err(AppError::conflict("Username"));
        }

        let user = match users.create(username, password_hash).await {
            Ok(user) => user,
            // lost a race with a concurrent signup for the same name
            Err(AppError::Database(e))
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) =>
            {
                return Err(AppError::conflict("Username"));
            }
            Err(e) => return Err(e),
        };

        session.login(user.id);
        tracing::info!(user_id = %user.id, "Account created");
        Ok(user)
    }

    async fn login(
        &self,
        session: &mut Session,
        username: String,
        password: String,
    ) -> AppResult<User> {
        let user = self.uow.users().find_by_username(&username).await?;

        // Verify against a dummy hash for unknown usernames so both
        // failure paths take the same time.
        let stored = Password::from_hash(
            user.as_ref()
                .map(|u| u.password_hash.clone())
                .unwrap_or_else(|| DUMMY_HASH.to_string()),
        );
        let password_valid = stored.verify(&password);

        match user {
            Some(user) if password_valid => {
                session.login(user.id);
                tracing::info!(user_id = %user.id, name = %user.display_name(), "User logged in");
                Ok(user)
            }
            _ => {
                tracing::warn!(%username, "Failed login attempt");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    fn logout(&self, session: &mut Session) {
        if let Some(user_id) = session.user_id() {
            tracing::info!(%user_id, "User logged out");
        }
        session.flush();
    }

    async fn account(&self, user_id: Uuid) -> AppResult<AccountView> {
        let user = self.uow.users().find_by_id(user_id).await?.ok_or_not_found()?;
        let customer = self.uow.customers().find_by_user(user_id).await?;
        Ok(AccountView::new(&user, customer))
    }

    async fn update_account(&self, user_id: Uuid, form: AccountForm) -> AppResult<AccountView> {
        let (identity, profile) = form.split();

        let (user, customer) = with_transaction!(self.uow, |ctx| {
            let user = ctx.users().update_identity(user_id, identity).await?;
            let customer = ctx.customers().upsert(user_id, profile).await?;
            Ok((user, customer))
        })?;

        tracing::info!(%user_id, customer_id = customer.id, "Account updated");
        Ok(AccountView::new(&user, Some(customer)))
    }
}
