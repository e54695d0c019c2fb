/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Audit timestamps (`created_at`, `updated_at`) are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Event start times are local wall-clock values without a zone, exactly as
/// the submitter entered them.
pub type LocalTimestamp = chrono::NaiveDateTime;

/// Users are owned by the hosted identity service and identified by UUID.
pub type UserId = uuid::Uuid;
