/// Video identifiers are opaque strings derived from the uploaded file name.
pub type VideoId = String;

/// Job, shot and summary identifiers are generated UUIDs.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
