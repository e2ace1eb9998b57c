use crate::utils::response::ApiError;

pub async fn global_error_handler() -> ApiError {
    ApiError::NotFound("Not Found".to_string())
}
