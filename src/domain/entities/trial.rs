use chrono::NaiveDateTime;

/// Trial length applied to accounts that never chose one explicitly.
pub const DEFAULT_TRIAL_DAYS: i32 = 14;

/// Resolve the effective trial start for an account.
///
/// Falls back to the account creation time when no explicit trial start was
/// recorded, and to `now` when neither exists (a freshly provisioned row).
pub fn trial_start(
    trial_started_at: Option<NaiveDateTime>,
    created_at: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> NaiveDateTime {
    trial_started_at.or(created_at).unwrap_or(now)
}

/// Whole days elapsed since the trial started.
///
/// A trial start in the future counts as zero days used.
pub fn days_used(start: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now - start).num_days().max(0)
}

/// Whole days remaining in the trial window. Never negative.
pub fn days_left(trial_days: i32, start: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (i64::from(trial_days) - days_used(start, now)).max(0)
}
