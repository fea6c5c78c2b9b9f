#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid period: {0}. Use 'hour' or 'day'")]
    InvalidPeriod(String),

    #[error("MAC {name} not found in data")]
    DeviceNotFound { name: String },
}
