//! Success envelope shared by every JSON handler.
//!
//! Successful bodies are always `{ "data": ... }`; errors use the
//! `{ "error", "code" }` shape produced by [`crate::error::AppError`].

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
