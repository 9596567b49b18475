use std::time::Duration;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Timed out waiting for {what} after {waited:?}")]
    Timeout { what: &'static str, waited: Duration },

    #[error("WiFi link error: {0}")]
    Link(String),

    #[error("Time request failed: {0}")]
    TimeRequest(String),

    #[error("Clock not set (epoch value {epoch})")]
    ClockUnset { epoch: i64 },

    #[error("Invalid UTC offset of {0} seconds")]
    Offset(i32),

    #[error("Failed to decode quote catalog")]
    Catalog(#[from] serde_json::Error),

    #[error("Quote catalog is empty")]
    EmptyCatalog,

    #[error("Panel error: {0}")]
    Panel(String),
}
