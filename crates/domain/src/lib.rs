//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod generation;
mod post;
mod user;

pub use generation::{CONTEXT_LENGTH, ContentTemplate, GenerationRequest, OBJECTIVE_LENGTH};
pub use post::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, NewPost, PostId, PostPage, PostQuery, StoredPost,
};
pub use user::{EmailAddress, IdentityClaims, LocalUser, UserId};
