//! Stored posts and history paging.

use chrono::{DateTime, Utc};
use contentai_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generation::ContentTemplate;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Unique identifier for a stored post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(Uuid);

impl PostId {
    /// Creates a new random post identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a post identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A generated or saved post owned by one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPost {
    /// Post identifier.
    pub id: PostId,
    /// Session subject of the owner, `"anonymous"` for unauthenticated generations.
    pub owner_subject: String,
    /// Template the post was written for.
    pub template: ContentTemplate,
    /// Objective supplied by the author.
    pub objective: String,
    /// Context supplied by the author.
    pub context: String,
    /// Post body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Client-supplied post to save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    template: ContentTemplate,
    objective: NonEmptyString,
    context: String,
    content: NonEmptyString,
}

impl NewPost {
    /// Validates a post submitted for saving.
    pub fn new(
        template: &str,
        objective: impl Into<String>,
        context: impl Into<String>,
        content: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            template: template.parse()?,
            objective: NonEmptyString::new(objective)?,
            context: context.into(),
            content: NonEmptyString::new(content)?,
        })
    }

    /// Creates the stored record for `owner_subject`.
    #[must_use]
    pub fn into_stored(self, owner_subject: &str, created_at: DateTime<Utc>) -> StoredPost {
        StoredPost {
            id: PostId::new(),
            owner_subject: owner_subject.to_owned(),
            template: self.template,
            objective: self.objective.into(),
            context: self.context,
            content: self.content.into(),
            created_at,
        }
    }
}

/// History page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    limit: u32,
    skip: u32,
    search: Option<String>,
}

impl PostQuery {
    /// Validates paging parameters; `limit` must be within `1..=100`.
    pub fn new(limit: Option<u32>, skip: Option<u32>, search: Option<String>) -> AppResult<Self> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let search = search
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            limit,
            skip: skip.unwrap_or(0),
            search,
        })
    }

    /// Returns the page size.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns how many posts precede the page.
    #[must_use]
    pub fn skip(&self) -> u32 {
        self.skip
    }

    /// Returns the case-insensitive search term matched against objective
    /// and content.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Returns whether `post` matches the search term.
    #[must_use]
    pub fn matches(&self, post: &StoredPost) -> bool {
        let Some(search) = self.search() else {
            return true;
        };

        let needle = search.to_lowercase();
        post.objective.to_lowercase().contains(needle.as_str())
            || post.content.to_lowercase().contains(needle.as_str())
    }
}

/// One page of a subject's posts, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPage {
    /// Posts on this page.
    pub posts: Vec<StoredPost>,
    /// Number of posts matching the query across all pages.
    pub total: u64,
    /// One-based page number derived from `skip / limit`.
    pub page: u64,
    /// Number of pages, at least one.
    pub total_pages: u64,
}

impl PostPage {
    /// Builds a page from the matching posts and the total match count.
    #[must_use]
    pub fn new(posts: Vec<StoredPost>, total: u64, query: &PostQuery) -> Self {
        let limit = u64::from(query.limit());
        Self {
            posts,
            total,
            page: u64::from(query.skip()) / limit + 1,
            total_pages: total.div_ceil(limit).max(1),
        }
    }
}
