use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use contentai_application::{DocumentUpload, decode_documents};
use contentai_core::{AppError, Caller};
use contentai_domain::GenerationRequest;
use tracing::debug;

use crate::dto::GenerateResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Multipart form: `template`, `objective`, `context`, and any number of
/// `documents` files.
pub async fn generate_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<GenerateResponse>> {
    let form = GenerateForm::read(multipart?).await?;

    let request = GenerationRequest::new(
        required(form.template, "template")?.as_str(),
        required(form.objective, "objective")?,
        required(form.context, "context")?,
    )?
    .with_documents(decode_documents(form.documents)?);

    let generated = state.generation_service.generate(&caller, &request).await?;

    Ok(Json(generated.into()))
}

#[derive(Default)]
struct GenerateForm {
    template: Option<String>,
    objective: Option<String>,
    context: Option<String>,
    documents: Vec<DocumentUpload>,
}

impl GenerateForm {
    async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_owned();
            match name.as_str() {
                "template" => form.template = Some(field.text().await?),
                "objective" => form.objective = Some(field.text().await?),
                "context" => form.context = Some(field.text().await?),
                "documents" => {
                    let file_name = field.file_name().unwrap_or("document").to_owned();
                    let bytes = field.bytes().await?;
                    form.documents.push(DocumentUpload::new(file_name, bytes.to_vec()));
                }
                other => debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("missing required field '{field}'")))
}
