//! Auth provider admin API integration

mod client;
mod types;

pub use client::{ProviderClient, ON_BEHALF_OF_HEADER};
pub use types::*;
