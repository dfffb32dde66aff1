//! REST API handlers and shared response types

pub mod health;
pub mod identity;
pub mod metrics;

use serde::{Deserialize, Serialize};

/// Standard success response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
