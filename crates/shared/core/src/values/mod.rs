use chrono::{DateTime, Utc};

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Symbol identifier for a tradeable asset
pub type Symbol = String;
