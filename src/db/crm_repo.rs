// src/db/crm_repo.rs

use chrono::Utc;
use sqlx::{Executor, Sqlite};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{Account, LEAD_STATUS_NEW, Lead, Opportunity},
};

/// All SQL for the three entity collections. Methods are generic over the
/// executor so services can run several of them inside one transaction.
///
/// Ids and creation timestamps are assigned here, at insert; created_at is
/// never touched again.
#[derive(Clone, Default)]
pub struct CrmRepository;

impl CrmRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  ACCOUNTS
    // =========================================================================

    pub async fn list_accounts<'e, E>(&self, executor: E) -> Result<Vec<Account>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, industry, website, created_at
            FROM accounts
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(accounts)
    }

    pub async fn create_account<'e, E>(
        &self,
        executor: E,
        name: &str,
        industry: Option<&str>,
        website: Option<&str>,
    ) -> Result<Account, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, name, industry, website, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, industry, website, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(industry)
        .bind(website)
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;

        Ok(account)
    }

    /// Full-resend update: unset optionals are written back as NULL.
    pub async fn update_account<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        industry: Option<&str>,
        website: Option<&str>,
    ) -> Result<Account, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET name = $1, industry = $2, website = $3
            WHERE id = $4
            RETURNING id, name, industry, website, created_at
            "#,
        )
        .bind(name)
        .bind(industry)
        .bind(website)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        account.ok_or(AppError::NotFound("account"))
    }

    pub async fn find_account<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Account>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, industry, website, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(account)
    }

    /// A foreign-key violation here means a dependent opportunity still
    /// exists (e.g. reintroduced by a racing write); that is the caller's
    /// 409, not a crash.
    pub async fn delete_account<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ForeignKeyConflict;
                    }
                }
                e.into()
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("account"));
        }

        Ok(())
    }

    // =========================================================================
    //  LEADS
    // =========================================================================

    pub async fn list_leads<'e, E>(&self, executor: E) -> Result<Vec<Lead>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT id, full_name, company, email, status, created_at
            FROM leads
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(leads)
    }

    pub async fn create_lead<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        company: Option<&str>,
        email: Option<&str>,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (id, full_name, company, email, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, full_name, company, email, status, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(full_name)
        .bind(company)
        .bind(email)
        .bind(LEAD_STATUS_NEW)
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;

        Ok(lead)
    }

    /// Sets the lead's status and returns the updated row.
    pub async fn set_lead_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: &str,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET status = $1
            WHERE id = $2
            RETURNING id, full_name, company, email, status, created_at
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        lead.ok_or(AppError::NotFound("lead"))
    }

    pub async fn delete_lead<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("lead"));
        }

        Ok(())
    }

    // =========================================================================
    //  OPPORTUNITIES
    // =========================================================================

    pub async fn list_opportunities<'e, E>(&self, executor: E) -> Result<Vec<Opportunity>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let opps = sqlx::query_as::<_, Opportunity>(
            r#"
            SELECT id, name, stage, amount, account_id, created_at
            FROM opportunities
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(opps)
    }

    pub async fn create_opportunity<'e, E>(
        &self,
        executor: E,
        account_id: Uuid,
        name: &str,
        stage: &str,
        amount: Option<f64>,
    ) -> Result<Opportunity, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let opp = sqlx::query_as::<_, Opportunity>(
            r#"
            INSERT INTO opportunities (id, name, stage, amount, account_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, stage, amount, account_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(stage)
        .bind(amount)
        .bind(account_id)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // The account vanished between the existence check and the insert.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return AppError::NotFound("account");
                }
            }
            e.into()
        })?;

        Ok(opp)
    }

    pub async fn delete_opportunities_by_account<'e, E>(
        &self,
        executor: E,
        account_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM opportunities WHERE account_id = $1")
            .bind(account_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
