//! Question catalog: the ordered, read-only list of survey questions.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single multiple-choice question.
///
/// Field names match the question file format:
///
/// ```json
/// { "text": "How was your stay?", "title": "rating", "question_list": ["Good", "Bad"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    /// Prompt shown to the user.
    pub text: String,
    /// Short noun used in the retry message ("please choose a {title}").
    pub title: String,
    /// Selectable choice labels, in display order.
    #[serde(rename = "question_list")]
    pub choices: Vec<String>,
}

impl QuestionDefinition {
    pub fn new(text: &str, title: &str, choices: &[&str]) -> Self {
        Self {
            text: text.to_string(),
            title: title.to_string(),
            choices: choices.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Immutable, validated list of questions.
///
/// Construct once at startup and share as `Arc<QuestionCatalog>`.
#[derive(Debug, Clone)]
pub struct QuestionCatalog {
    questions: Arc<[QuestionDefinition]>,
}

impl QuestionCatalog {
    /// Build a catalog, rejecting an empty list or a question without choices.
    pub fn new(questions: Vec<QuestionDefinition>) -> Result<Self, ConfigError> {
        if questions.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if let Some((index, q)) = questions
            .iter()
            .enumerate()
            .find(|(_, q)| q.choices.is_empty())
        {
            return Err(ConfigError::NoChoices {
                index,
                title: q.title.clone(),
            });
        }
        Ok(Self {
            questions: questions.into(),
        })
    }

    /// Parse a JSON array of question records.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let questions: Vec<QuestionDefinition> =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        Self::new(questions)
    }

    /// Load the catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::MissingCatalog {
                path: path.to_path_buf(),
            },
            _ => ConfigError::ReadCatalog {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            questions = catalog.len(),
            "Question catalog loaded"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false for a constructed catalog; present for API completeness with `len`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, step: usize) -> Option<&QuestionDefinition> {
        self.questions.get(step)
    }

    /// The opening question. Catalogs are never empty.
    pub fn first(&self) -> &QuestionDefinition {
        &self.questions[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestionDefinition> {
        self.questions.iter()
    }
}
