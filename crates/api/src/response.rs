//! Shared response envelope types for API handlers.
//!
//! JSON endpoints answer with a `{ "data": ... }` envelope. The coffee shop
//! list is the one exception and returns a bare array.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
