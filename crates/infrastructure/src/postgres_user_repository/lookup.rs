use super::*;

impl PostgresUserRepository {
    pub(super) async fn find_by_email_impl(
        &self,
        email: &EmailAddress,
    ) -> AppResult<Option<UserRecord>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, UserRow>(query.as_str())
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(internal("find user by email"))?
            .map(UserRecord::try_from)
            .transpose()
    }

    pub(super) async fn find_by_id_impl(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, UserRow>(query.as_str())
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(internal("find user by id"))?
            .map(UserRecord::try_from)
            .transpose()
    }
}
