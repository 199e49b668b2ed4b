/// All document ids are random UUIDs.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh document id.
pub fn new_id() -> DbId {
    uuid::Uuid::new_v4()
}
