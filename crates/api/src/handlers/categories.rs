use axum::Json;
use eventboard_core::category::{category_options, CategoryOption};

use crate::response::DataResponse;

/// GET /api/v1/categories
///
/// Category picker contents in display order.
pub async fn list() -> Json<DataResponse<Vec<CategoryOption>>> {
    Json(DataResponse {
        data: category_options(),
    })
}
