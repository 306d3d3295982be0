pub mod client;
pub mod error;

pub use client::{ApiClient, ApiResponse, path_segment};
pub use error::{ApiError, Result};
