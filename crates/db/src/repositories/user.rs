//! User repository for database operations.

use async_trait::async_trait;
use chrono::Utc;
use loyalty_core::StoreError;
use loyalty_core::auth::{UserRecord, UserStore};
use loyalty_shared::types::UserId;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::convert::db_err;
use crate::entities::{balances, users};

/// Result of [`UserRepository::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUser {
    /// User and zero balance were created.
    Created(users::Model),
    /// Another user already holds the login.
    LoginTaken,
}

/// User repository for registration and login lookups.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(&self.db)
            .await
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, DbErr> {
        users::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a user and its zero balance in one transaction.
    ///
    /// A login collision, including one lost to a concurrent registration,
    /// returns `LoginTaken` and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, login: &str, password_hash: &str) -> Result<CreateUser, DbErr> {
        let now = Utc::now().into();
        let user = users::Model {
            id: Uuid::now_v7(),
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        };

        let txn = self.db.begin().await?;

        let inserted = users::Entity::insert(users::ActiveModel {
            id: Set(user.id),
            login: Set(user.login.clone()),
            password_hash: Set(user.password_hash.clone()),
            created_at: Set(now),
        })
        .on_conflict(OnConflict::column(users::Column::Login).do_nothing().to_owned())
        .exec_without_returning(&txn)
        .await?;

        if inserted == 0 {
            return Ok(CreateUser::LoginTaken);
        }

        balances::Entity::insert(balances::ActiveModel {
            user_id: Set(user.id),
            current: Set(Decimal::ZERO),
            withdrawn: Set(Decimal::ZERO),
            updated_at: Set(now),
        })
        .exec_without_returning(&txn)
        .await?;

        txn.commit().await?;

        Ok(CreateUser::Created(user))
    }

    /// Checks if a login is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn login_exists(&self, login: &str) -> Result<bool, DbErr> {
        let count = users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}

fn record(model: users::Model) -> UserRecord {
    UserRecord {
        id: UserId::from_uuid(model.id),
        login: model.login,
        password_hash: model.password_hash,
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_user(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        match self.create(login, password_hash).await.map_err(db_err)? {
            CreateUser::Created(model) => Ok(Some(record(model))),
            CreateUser::LoginTaken => Ok(None),
        }
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(UserRepository::find_by_login(self, login)
            .await
            .map_err(db_err)?
            .map(record))
    }
}
