/// Job identifiers are opaque strings (UUID v4 text when minted by the API).
pub type JobId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
