use std::str::FromStr;

use contentai_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Accepted objective length in characters.
pub const OBJECTIVE_LENGTH: std::ops::RangeInclusive<usize> = 10..=500;

/// Accepted context length in characters.
pub const CONTEXT_LENGTH: std::ops::RangeInclusive<usize> = 10..=1000;

/// Post styles the generator knows how to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentTemplate {
    /// Technology trends and their impact.
    TechInsight,
    /// A startup journey with milestones and lessons.
    StartupStory,
    /// A new product announcement.
    ProductLaunch,
    /// Industry and market analysis.
    IndustryUpdate,
}

impl ContentTemplate {
    /// Every template, in display order.
    pub const ALL: [Self; 4] = [
        Self::TechInsight,
        Self::StartupStory,
        Self::ProductLaunch,
        Self::IndustryUpdate,
    ];

    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TechInsight => "tech-insight",
            Self::StartupStory => "startup-story",
            Self::ProductLaunch => "product-launch",
            Self::IndustryUpdate => "industry-update",
        }
    }

    /// Returns the writing brief for this template.
    #[must_use]
    pub fn guidelines(self) -> &'static str {
        match self {
            Self::TechInsight => {
                "Create a LinkedIn post discussing technology trends, focusing on innovation impact and future implications."
            }
            Self::StartupStory => {
                "Write an inspiring LinkedIn post about a startup journey, highlighting key milestones, challenges overcome, and lessons learned."
            }
            Self::ProductLaunch => {
                "Craft an engaging LinkedIn announcement about a new product launch, emphasizing unique features and customer benefits."
            }
            Self::IndustryUpdate => {
                "Compose a LinkedIn post analyzing industry trends, market developments, and their business implications."
            }
        }
    }
}

impl FromStr for ContentTemplate {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|template| template.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("invalid template type '{value}'")))
    }
}

/// Validated generation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    template: ContentTemplate,
    objective: String,
    context: String,
    documents: Vec<String>,
}

impl GenerationRequest {
    /// Creates a generation request from raw client values.
    pub fn new(
        template: &str,
        objective: impl Into<String>,
        context: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            template: template.parse()?,
            objective: bounded_text("objective", objective.into(), OBJECTIVE_LENGTH)?,
            context: bounded_text("context", context.into(), CONTEXT_LENGTH)?,
            documents: Vec::new(),
        })
    }

    /// Attaches decoded reference documents.
    #[must_use]
    pub fn with_documents(mut self, documents: Vec<String>) -> Self {
        self.documents = documents;
        self
    }

    /// Returns the requested template.
    #[must_use]
    pub fn template(&self) -> ContentTemplate {
        self.template
    }

    /// Returns what the content should achieve.
    #[must_use]
    pub fn objective(&self) -> &str {
        self.objective.as_str()
    }

    /// Returns background material for the content.
    #[must_use]
    pub fn context(&self) -> &str {
        self.context.as_str()
    }

    /// Returns reference documents supplied with the request.
    #[must_use]
    pub fn documents(&self) -> &[String] {
        &self.documents
    }
}

fn bounded_text(
    field: &str,
    value: String,
    bounds: std::ops::RangeInclusive<usize>,
) -> AppResult<String> {
    let value = value.trim().to_owned();
    let length = value.chars().count();
    if !bounds.contains(&length) {
        return Err(AppError::Validation(format!(
            "{field} must be between {} and {} characters, got {length}",
            bounds.start(),
            bounds.end()
        )));
    }

    Ok(value)
}
