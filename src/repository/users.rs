//! Users repository for database operations

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::UserStore;
use crate::{
    error::AppResult,
    models::user::{NewUser, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UsersRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(email) = LOWER($1)"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, data: &NewUser) -> AppResult<User> {
        // A concurrent first login for the same email keeps the existing row
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (provider_id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING *
            "#,
        )
        .bind(&data.provider_id)
        .bind(&data.name)
        .bind(&data.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}
