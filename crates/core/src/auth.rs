use serde::{Deserialize, Serialize};

/// Subject recorded for requests that carry no verified session.
pub const ANONYMOUS_SUBJECT: &str = "anonymous";

/// The principal behind a request, as established by the HTTP boundary.
///
/// `Anonymous` only ever appears on endpoints whose auth policy explicitly
/// degrades; required-auth endpoints reject instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Caller {
    /// A caller holding a valid session token for `subject`.
    Authenticated {
        /// Stable local user identifier from the session token.
        subject: String,
    },
    /// A caller without a (valid) session token.
    Anonymous,
}

impl Caller {
    /// Creates an authenticated caller.
    #[must_use]
    pub fn authenticated(subject: impl Into<String>) -> Self {
        Self::Authenticated {
            subject: subject.into(),
        }
    }

    /// Returns the subject, or [`ANONYMOUS_SUBJECT`] for anonymous callers.
    #[must_use]
    pub fn subject(&self) -> &str {
        match self {
            Self::Authenticated { subject } => subject.as_str(),
            Self::Anonymous => ANONYMOUS_SUBJECT,
        }
    }

    /// Returns whether the caller presented a valid session.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}
