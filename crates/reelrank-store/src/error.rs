use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("half-life must be between 1 and 365 days, got {0}")]
    InvalidHalfLife(f64),

    #[error("view range is empty: min_views {min} exceeds max_views {max}")]
    InvalidViewRange { min: u64, max: u64 },
}
