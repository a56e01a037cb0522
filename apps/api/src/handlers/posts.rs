use axum::extract::State;
use axum::{Extension, Json};
use contentai_core::Caller;
use contentai_domain::{NewPost, PostId, PostQuery};
use uuid::Uuid;

use crate::dto::{DeletePostResponse, HistoryQuery, PostPageResponse, PostResponse, SavePostRequest};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

pub async fn history_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<PostPageResponse>> {
    let query = PostQuery::new(query.limit, query.skip, query.search)?;
    let page = state.post_service.history(&caller, &query).await?;

    Ok(Json(page.into()))
}

pub async fn save_post_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiJson(payload): ApiJson<SavePostRequest>,
) -> ApiResult<Json<PostResponse>> {
    let post = NewPost::new(
        payload.template.as_str(),
        payload.objective,
        payload.context,
        payload.generated_content,
    )?;
    let saved = state.post_service.save(&caller, post).await?;

    Ok(Json(saved.into()))
}

pub async fn delete_post_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    ApiPath(post_id): ApiPath<Uuid>,
) -> ApiResult<Json<DeletePostResponse>> {
    state
        .post_service
        .delete(&caller, PostId::from_uuid(post_id))
        .await?;

    Ok(Json(DeletePostResponse {
        message: "post deleted successfully",
    }))
}
