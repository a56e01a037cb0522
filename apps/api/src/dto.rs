use contentai_application::GeneratedContent;
use contentai_domain::{LocalUser, PostPage, StoredPost};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Google sign-in request carrying the Google ID token.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-request.ts"
)]
pub struct LoginRequest {
    pub token: String,
}

/// Public view of a local user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
}

impl From<LocalUser> for UserResponse {
    fn from(user: LocalUser) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            picture: user.picture,
        }
    }
}

/// Session token and user returned by a successful sign-in.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/login-response.ts"
)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Generated post.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generate-response.ts"
)]
pub struct GenerateResponse {
    pub id: String,
    pub post: String,
    pub template: String,
}

impl From<GeneratedContent> for GenerateResponse {
    fn from(generated: GeneratedContent) -> Self {
        Self {
            id: generated.post_id.to_string(),
            post: generated.content,
            template: generated.template.as_str().to_owned(),
        }
    }
}

/// History paging and search parameters.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/history-query.ts"
)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    pub search: Option<String>,
}

/// Post submitted for saving.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/save-post-request.ts"
)]
pub struct SavePostRequest {
    pub template: String,
    pub objective: String,
    #[serde(default)]
    pub context: String,
    pub generated_content: String,
}

/// Stored post.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/post-response.ts"
)]
pub struct PostResponse {
    pub id: String,
    pub template: String,
    pub objective: String,
    pub context: String,
    pub generated_content: String,
    pub created_at: String,
}

impl From<StoredPost> for PostResponse {
    fn from(post: StoredPost) -> Self {
        Self {
            id: post.id.to_string(),
            template: post.template.as_str().to_owned(),
            objective: post.objective,
            context: post.context,
            generated_content: post.content,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// One page of the caller's posts.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/post-page-response.ts"
)]
pub struct PostPageResponse {
    pub posts: Vec<PostResponse>,
    #[ts(type = "number")]
    pub total: u64,
    #[ts(type = "number")]
    pub page: u64,
    #[serde(rename = "totalPages")]
    #[ts(type = "number")]
    pub total_pages: u64,
}

impl From<PostPage> for PostPageResponse {
    fn from(page: PostPage) -> Self {
        Self {
            posts: page.posts.into_iter().map(PostResponse::from).collect(),
            total: page.total,
            page: page.page,
            total_pages: page.total_pages,
        }
    }
}

/// Confirmation returned after deleting a post.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/delete-post-response.ts"
)]
pub struct DeletePostResponse {
    pub message: &'static str,
}
