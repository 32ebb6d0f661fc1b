use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocError {
    #[error("sheet capacity must be a positive finite area, got {capacity}")]
    InvalidCapacity { capacity: f64 },
    #[error("item {index} is invalid: {reason}")]
    InvalidItem { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, AllocError>;
