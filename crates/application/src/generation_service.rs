//! Content generation port and application service.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use contentai_core::{AppError, AppResult, Caller};
use contentai_domain::{ContentTemplate, GenerationRequest, PostId, StoredPost};

use crate::post_service::PostRepository;

mod documents;


pub use documents::{
    DocumentUpload, MAX_DOCUMENT_BYTES, MAX_TOTAL_DOCUMENT_BYTES, decode_documents,
};

/// Generated posts shorter than this many words are treated as a failed generation.
pub const MIN_GENERATED_WORDS: usize = 5;

/// Characters of each reference document quoted in the prompt.
const DOCUMENT_EXCERPT_CHARS: usize = 1000;

const SYSTEM_PROMPT: &str = "You are a professional LinkedIn Marketing Specialist with expertise in creating engaging and impactful posts. Follow these guidelines:
1. Start with a bold, attention-grabbing headline
2. Write in a professional yet conversational tone
3. Include specific, actionable insights
4. Use clear paragraph breaks for readability
5. End with a compelling call-to-action
6. Keep paragraphs concise (2-4 sentences)
7. Format using LinkedIn-optimized structure
";

/// Port for the external text-generation backend.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generates text for a fully built prompt.
    async fn generate(&self, prompt: &GenerationPrompt) -> AppResult<String>;
}

/// Prompt handed to a [`ContentGenerator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    /// Instructions describing the writer's role and format.
    pub system: String,
    /// The concrete request.
    pub user: String,
}

/// Generated content returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    /// Identifier of the stored post.
    pub post_id: PostId,
    /// Template the content was written for.
    pub template: ContentTemplate,
    /// Generated text.
    pub content: String,
    /// Subject the content was generated for, `"anonymous"` if unauthenticated.
    pub subject: String,
}

/// Application service for content generation.
#[derive(Clone)]
pub struct GenerationService {
    generator: Arc<dyn ContentGenerator>,
    posts: Arc<dyn PostRepository>,
}

impl GenerationService {
    /// Creates a new generation service storing results in `posts`.
    #[must_use]
    pub fn new(generator: Arc<dyn ContentGenerator>, posts: Arc<dyn PostRepository>) -> Self {
        Self { generator, posts }
    }

    /// Generates content for `request` on behalf of `caller` and stores it
    /// under the caller's subject.
    pub async fn generate(
        &self,
        caller: &Caller,
        request: &GenerationRequest,
    ) -> AppResult<GeneratedContent> {
        let prompt = build_prompt(request);
        let content = self.generator.generate(&prompt).await?;

        let content = content.trim().to_owned();
        let words = content.split_whitespace().count();
        if words < MIN_GENERATED_WORDS {
            warn!(words, "generation backend returned too little text");
            return Err(AppError::Upstream("generated text too short".to_owned()));
        }

        let post = StoredPost {
            id: PostId::new(),
            owner_subject: caller.subject().to_owned(),
            template: request.template(),
            objective: request.objective().to_owned(),
            context: request.context().to_owned(),
            content,
            created_at: Utc::now(),
        };
        self.posts.insert(&post).await?;

        info!(
            post_id = %post.id,
            subject = caller.subject(),
            template = request.template().as_str(),
            documents = request.documents().len(),
            words,
            "generated content"
        );

        Ok(GeneratedContent {
            post_id: post.id,
            template: post.template,
            content: post.content,
            subject: post.owner_subject,
        })
    }
}

fn build_prompt(request: &GenerationRequest) -> GenerationPrompt {
    let mut user = format!(
        "Topic: {}\n\nContext: {}\n\n",
        request.objective(),
        request.context()
    );

    if !request.documents().is_empty() {
        user.push_str("\nAdditional Context from Documents:\n");
        for (index, text) in request.documents().iter().enumerate() {
            let _ = write!(user, "Document {}:\n{}\n\n", index + 1, excerpt(text));
        }
    }

    let _ = write!(
        user,
        "Template Guidelines: {}\n\n",
        request.template().guidelines()
    );

    GenerationPrompt {
        system: SYSTEM_PROMPT.to_owned(),
        user,
    }
}

fn excerpt(text: &str) -> String {
    match text.char_indices().nth(DOCUMENT_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}
