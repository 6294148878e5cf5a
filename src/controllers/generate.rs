use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    domain::generation::{GenerateRequest, GenerateResponse, GenerationService},
    error::{AppError, AppResult},
};

/// Context length accepted for generation requests
const MAX_CONTEXT_CHARS: usize = 1500;

pub struct GenerateController {
    generation_service: Arc<GenerationService>,
}

impl GenerateController {
    pub fn new(generation_service: Arc<GenerationService>) -> Self {
        Self { generation_service }
    }

    /// POST /v1/generate - Generate pickup lines or conversation replies
    pub async fn generate(
        State(controller): State<Arc<GenerateController>>,
        Json(request): Json<GenerateRequest>,
    ) -> AppResult<Json<GenerateResponse>> {
        let context_length = request.context.chars().count();
        if context_length == 0 || context_length > MAX_CONTEXT_CHARS {
            return Err(AppError::Validation(format!(
                "context must be between 1 and {} characters",
                MAX_CONTEXT_CHARS
            )));
        }

        tracing::info!(
            mode = ?request.mode,
            style = ?request.style,
            context_length,
            "Generation request"
        );

        let response = controller
            .generation_service
            .generate(&request)
            .await
            .map_err(AppError::from)?;

        Ok(Json(response))
    }
}
