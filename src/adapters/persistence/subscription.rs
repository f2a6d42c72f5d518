use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::{
        payment_provider::PaymentProvider,
        subscription::{SubscriptionRecord, SubscriptionStatus},
    },
    use_cases::billing::SubscriptionRepo,
};

fn row_to_record(row: &sqlx::postgres::PgRow) -> SubscriptionRecord {
    SubscriptionRecord {
        id: row.get("id"),
        account_id: row.get("account_id"),
        provider: row.get("provider"),
        provider_subscription_id: row.get("provider_subscription_id"),
        payer_id: row.get("payer_id"),
        status: row.get("status"),
        last_payment_at: row.get("last_payment_at"),
        last_event_at: row.get("last_event_at"),
        cancelled_at: row.get("cancelled_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, account_id, provider, provider_subscription_id, payer_id, status,
    last_payment_at, last_event_at, cancelled_at, created_at, updated_at
"#;

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn get_by_account_id(&self, account_id: Uuid) -> AppResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscription_records WHERE account_id = $1",
            SELECT_COLS
        ))
        .bind(account_id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn get_by_payer_id(&self, payer_id: &str) -> AppResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscription_records WHERE payer_id = $1
             ORDER BY updated_at DESC LIMIT 1",
            SELECT_COLS
        ))
        .bind(payer_id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_record))
    }

    async fn upsert(&self, record: &SubscriptionRecord) -> AppResult<SubscriptionRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO subscription_records
                (id, account_id, provider, provider_subscription_id, payer_id, status,
                 last_payment_at, last_event_at, cancelled_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (account_id) DO UPDATE SET
                provider = EXCLUDED.provider,
                provider_subscription_id = EXCLUDED.provider_subscription_id,
                payer_id = EXCLUDED.payer_id,
                status = EXCLUDED.status,
                last_payment_at = EXCLUDED.last_payment_at,
                last_event_at = EXCLUDED.last_event_at,
                cancelled_at = EXCLUDED.cancelled_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(record.id)
        .bind(record.account_id)
        .bind(record.provider)
        .bind(&record.provider_subscription_id)
        .bind(&record.payer_id)
        .bind(record.status)
        .bind(record.last_payment_at)
        .bind(record.last_event_at)
        .bind(record.cancelled_at)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row_to_record(&row))
    }

    async fn attach(
        &self,
        account_id: Uuid,
        provider: PaymentProvider,
        provider_subscription_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<SubscriptionRecord> {
        // The partial unique index on provider_subscription_id rejects the
        // write when another account already holds this subscription, which
        // the error mapping surfaces as a conflict.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO subscription_records
                (id, account_id, provider, provider_subscription_id, status,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (account_id) DO UPDATE SET
                provider = EXCLUDED.provider,
                provider_subscription_id = EXCLUDED.provider_subscription_id,
                status = EXCLUDED.status,
                cancelled_at = NULL,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(provider)
        .bind(provider_subscription_id)
        .bind(SubscriptionStatus::Active)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row_to_record(&row))
    }

    async fn mark_cancelled(
        &self,
        account_id: Uuid,
        provider_subscription_id: &str,
        cancelled_at: NaiveDateTime,
    ) -> AppResult<Option<SubscriptionRecord>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE subscription_records
            SET status = $3, cancelled_at = $4, updated_at = $4
            WHERE account_id = $1 AND provider_subscription_id = $2
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(account_id)
        .bind(provider_subscription_id)
        .bind(SubscriptionStatus::Inactive)
        .bind(cancelled_at)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_record))
    }
}
