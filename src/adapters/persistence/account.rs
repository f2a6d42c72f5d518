use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::{
        account::{Account, ProfileLink},
        subscription::SubscriptionRecord,
    },
    use_cases::account::{AccountRepo, ProfileUpdate},
};

fn row_to_account(row: &sqlx::postgres::PgRow) -> Account {
    let id: Uuid = row.get("id");
    let links_json: serde_json::Value = row.get("links");
    let links: Vec<ProfileLink> =
        super::parse_json_with_fallback(&links_json, "links", "account", &id.to_string());

    Account {
        id,
        slug: row.get("slug"),
        display_name: row.get("display_name"),
        trade: row.get("trade"),
        headline: row.get("headline"),
        phone: row.get("phone"),
        location: row.get("location"),
        links,
        trial_started_at: row.get("trial_started_at"),
        trial_days: row.get("trial_days"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, slug, display_name, trade, headline, phone, location, links,
    trial_started_at, trial_days, created_at, updated_at
"#;

#[async_trait]
impl AccountRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_account))
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE lower(slug) = lower($1)",
            SELECT_COLS
        ))
        .bind(slug)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_account))
    }

    async fn update_profile(&self, id: Uuid, input: &ProfileUpdate) -> AppResult<Account> {
        let links = serde_json::to_value(&input.links)
            .map_err(|e| AppError::Internal(format!("Failed to serialize links: {e}")))?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE accounts
            SET display_name = $2, trade = $3, headline = $4, phone = $5,
                location = $6, links = $7, updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(&input.display_name)
        .bind(&input.trade)
        .bind(&input.headline)
        .bind(&input.phone)
        .bind(&input.location)
        .bind(links)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;

        row.as_ref().map(row_to_account).ok_or(AppError::NotFound)
    }

    async fn list_with_subscriptions(
        &self,
    ) -> AppResult<Vec<(Account, Option<SubscriptionRecord>)>> {
        let rows = sqlx::query(
            r#"
            SELECT
                a.id, a.slug, a.display_name, a.trade, a.headline, a.phone, a.location,
                a.links, a.trial_started_at, a.trial_days, a.created_at, a.updated_at,
                s.id as s_id, s.account_id as s_account_id, s.provider as s_provider,
                s.provider_subscription_id as s_provider_subscription_id,
                s.payer_id as s_payer_id, s.status as s_status,
                s.last_payment_at as s_last_payment_at, s.last_event_at as s_last_event_at,
                s.cancelled_at as s_cancelled_at,
                s.created_at as s_created_at, s.updated_at as s_updated_at
            FROM accounts a
            LEFT JOIN subscription_records s ON s.account_id = a.id
            ORDER BY a.created_at ASC
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(AppError::from)?;

        Ok(rows
            .iter()
            .map(|row| {
                let account = row_to_account(row);
                let record = row
                    .get::<Option<Uuid>, _>("s_id")
                    .map(|record_id| SubscriptionRecord {
                        id: record_id,
                        account_id: row.get("s_account_id"),
                        provider: row.get("s_provider"),
                        provider_subscription_id: row.get("s_provider_subscription_id"),
                        payer_id: row.get("s_payer_id"),
                        status: row.get("s_status"),
                        last_payment_at: row.get("s_last_payment_at"),
                        last_event_at: row.get("s_last_event_at"),
                        cancelled_at: row.get("s_cancelled_at"),
                        created_at: row.get("s_created_at"),
                        updated_at: row.get("s_updated_at"),
                    });
                (account, record)
            })
            .collect())
    }
}
