use super::*;

impl PostgresUserRepository {
    pub(super) async fn next_membership_sequence_impl(&self, year: i32) -> AppResult<u64> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO membership_sequences (year, last_value)
            VALUES ($1, 1)
            ON CONFLICT (year) DO UPDATE
            SET last_value = membership_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(year)
        .fetch_one(&self.pool)
        .await
        .map_err(internal("allocate membership number"))?;

        to_u64("membership_sequences.last_value", value)
    }

    pub(super) async fn create_user_impl(
        &self,
        user: NewUserRecord,
    ) -> AppResult<RegisteredUser> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(internal("begin transaction"))?;

        let query = format!(
            r#"
            INSERT INTO users (id, email, full_name, password_hash, status, membership_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(query.as_str())
            .bind(UserId::new().as_uuid())
            .bind(user.email.as_str())
            .bind(user.full_name.as_str())
            .bind(user.password_hash.as_str())
            .bind(user.status.as_str())
            .bind(user.membership_number.as_str())
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| email_conflict_or_internal(error, "create user"))?;
        let account = UserRecord::try_from(row)?.account;

        let membership = user
            .initial_branch
            .map(|branch_id| Membership::pending(account.user_id, branch_id, account.created_at));
        if let Some(membership) = &membership {
            sqlx::query(
                r#"
                INSERT INTO memberships (
                    id, user_id, branch_id, status, card_issued, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(membership.membership_id.as_uuid())
            .bind(membership.user_id.as_uuid())
            .bind(membership.branch_id.as_uuid())
            .bind(membership.status.as_str())
            .bind(membership.card_issued)
            .bind(membership.created_at)
            .bind(membership.updated_at)
            .execute(&mut *transaction)
            .await
            .map_err(internal("create initial membership"))?;
        }

        transaction
            .commit()
            .await
            .map_err(internal("commit transaction"))?;

        Ok(RegisteredUser {
            account,
            membership,
        })
    }

    pub(super) async fn list_users_impl(
        &self,
        filter: &UserFilter,
    ) -> AppResult<Page<UserAccount>> {
        let (limit, offset) = page_bounds(&filter.page)?;
        let branch_ids: Option<Vec<uuid::Uuid>> = filter
            .branch_ids
            .as_ref()
            .map(|branch_ids| branch_ids.iter().map(|id| id.as_uuid()).collect());
        let search = filter
            .search
            .as_deref()
            .map(|search| format!("%{}%", escape_like(search)));
        let conditions = r#"
            ($1::TEXT IS NULL OR users.status = $1)
            AND ($2::UUID[] IS NULL OR EXISTS (
                SELECT 1 FROM memberships
                WHERE memberships.user_id = users.id
                  AND memberships.branch_id = ANY($2)
            ))
            AND ($3::TEXT IS NULL
                OR users.full_name ILIKE $3
                OR users.membership_number ILIKE $3)
        "#;

        let total = sqlx::query_scalar::<_, i64>(
            format!("SELECT COUNT(*) FROM users WHERE {conditions}").as_str(),
        )
        .bind(filter.status.map(|status| status.as_str()))
        .bind(branch_ids.as_deref())
        .bind(search.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(internal("count users"))?;

        let query = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE {conditions}
            ORDER BY users.full_name, users.id
            LIMIT $4 OFFSET $5
            "#
        );
        let rows = sqlx::query_as::<_, UserRow>(query.as_str())
            .bind(filter.status.map(|status| status.as_str()))
            .bind(branch_ids.as_deref())
            .bind(search.as_deref())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(internal("list users"))?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(|row| UserRecord::try_from(row).map(|record| record.account))
                .collect::<AppResult<Vec<_>>>()?,
            total: to_u64("count", total)?,
        })
    }

    pub(super) async fn update_profile_impl(
        &self,
        user_id: UserId,
        patch: &UserProfilePatch,
    ) -> AppResult<Option<UserAccount>> {
        let query = format!(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name), updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, UserRow>(query.as_str())
            .bind(user_id.as_uuid())
            .bind(patch.full_name.as_ref().map(NonEmptyString::as_str))
            .fetch_optional(&self.pool)
            .await
            .map_err(internal("update user profile"))?
            .map(|row| UserRecord::try_from(row).map(|record| record.account))
            .transpose()
    }

    pub(super) async fn update_status_impl(
        &self,
        user_id: UserId,
        status: UserStatus,
    ) -> AppResult<Option<UserAccount>> {
        let query = format!(
            r#"
            UPDATE users
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, UserRow>(query.as_str())
            .bind(user_id.as_uuid())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(internal("update user status"))?
            .map(|row| UserRecord::try_from(row).map(|record| record.account))
            .transpose()
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
