// src/services/crm_service.rs

use sqlx::{Acquire, Executor, Sqlite};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmRepository,
    models::crm::{
        Account, LEAD_STATUS_QUALIFIED, Lead, LeadConversion, OPP_STAGE_PROSPECTING, Opportunity,
    },
};

/// Validation and orchestration over the record store. The two composite
/// operations (lead conversion, cascading account delete) each run inside a
/// single transaction so partial failure cannot leave intermediate state.
#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
}

impl CrmService {
    pub fn new(repo: CrmRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  ACCOUNTS
    // =========================================================================

    pub async fn list_accounts<'e, E>(&self, executor: E) -> Result<Vec<Account>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo.list_accounts(executor).await
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
        if name.trim().is_empty() {
            return Err(AppError::required("name"));
        }

        self.repo
            .create_account(executor, name, industry, website)
            .await
    }

    /// Callers must resend every field; omitted optionals are cleared, not
    /// preserved.
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
        if name.trim().is_empty() {
            return Err(AppError::required("name"));
        }

        self.repo
            .update_account(executor, id, name, industry, website)
            .await
    }

    /// FK-safe delete: removes dependent opportunities, then the account,
    /// in one transaction.
    pub async fn delete_account<'e, A>(&self, acquirable: A, id: Uuid) -> Result<(), AppError>
    where
        A: Acquire<'e, Database = Sqlite>,
    {
        let mut tx = acquirable.begin().await?;

        self.repo
            .delete_opportunities_by_account(&mut *tx, id)
            .await?;
        self.repo.delete_account(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(())
    }

    // =========================================================================
    //  LEADS
    // =========================================================================

    pub async fn list_leads<'e, E>(&self, executor: E) -> Result<Vec<Lead>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo.list_leads(executor).await
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
        if full_name.trim().is_empty() {
            return Err(AppError::required("fullName"));
        }

        self.repo.create_lead(executor, full_name, company, email).await
    }

    /// Converts a lead in one transaction: mark it QUALIFIED, create an
    /// account named after its company (falling back to the contact name),
    /// and seed a PROSPECTING opportunity under that account.
    ///
    /// The lead record itself survives. Converting the same lead again
    /// creates another account/opportunity pair; the operation is not
    /// idempotent, only atomic.
    pub async fn convert_lead<'e, A>(
        &self,
        acquirable: A,
        id: Uuid,
    ) -> Result<LeadConversion, AppError>
    where
        A: Acquire<'e, Database = Sqlite>,
    {
        let mut tx = acquirable.begin().await?;

        let lead = self
            .repo
            .set_lead_status(&mut *tx, id, LEAD_STATUS_QUALIFIED)
            .await?;

        let account_name = match lead.company.as_deref() {
            Some(company) if !company.trim().is_empty() => company,
            _ => lead.full_name.as_str(),
        };
        let account = self
            .repo
            .create_account(&mut *tx, account_name, None, None)
            .await?;

        let opp = self
            .repo
            .create_opportunity(
                &mut *tx,
                account.id,
                &format!("New deal - {}", lead.full_name),
                OPP_STAGE_PROSPECTING,
                None,
            )
            .await?;

        tx.commit().await?;

        Ok(LeadConversion { account, opp })
    }

    pub async fn delete_lead<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        // Leads have no dependents; no cascade needed.
        self.repo.delete_lead(executor, id).await
    }

    // =========================================================================
    //  OPPORTUNITIES
    // =========================================================================

    pub async fn list_opportunities<'e, E>(&self, executor: E) -> Result<Vec<Opportunity>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        self.repo.list_opportunities(executor).await
    }

    /// The existence check and the insert share a transaction so they see
    /// one snapshot of the accounts table.
    pub async fn create_opportunity<'e, A>(
        &self,
        acquirable: A,
        account_id: Uuid,
        name: &str,
        amount: Option<f64>,
    ) -> Result<Opportunity, AppError>
    where
        A: Acquire<'e, Database = Sqlite>,
    {
        if name.trim().is_empty() {
            return Err(AppError::required("name"));
        }
        if amount.is_some_and(|a| a < 0.0) {
            return Err(AppError::invalid("amount", "amount must be non-negative"));
        }

        let mut tx = acquirable.begin().await?;

        if self.repo.find_account(&mut *tx, account_id).await?.is_none() {
            return Err(AppError::NotFound("account"));
        }

        let opp = self
            .repo
            .create_opportunity(&mut *tx, account_id, name, OPP_STAGE_PROSPECTING, amount)
            .await?;

        tx.commit().await?;

        Ok(opp)
    }
}
