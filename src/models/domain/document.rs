use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subject categories a document can be classified into. Closed set; the
/// categorization prompt is constrained to these labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DocumentCategory {
    #[serde(rename = "Science")]
    Science,
    #[serde(rename = "History & Social Science")]
    HistorySocialScience,
    #[serde(rename = "Mathematics")]
    Mathematics,
    #[serde(rename = "Computer Science & Coding")]
    ComputerScienceCoding,
    #[serde(rename = "Engineering")]
    Engineering,
    #[serde(rename = "Language Learning & Literature")]
    LanguageLearningLiterature,
    #[serde(rename = "General & Other")]
    GeneralOther,
}

impl DocumentCategory {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentCategory::Science => "Science",
            DocumentCategory::HistorySocialScience => "History & Social Science",
            DocumentCategory::Mathematics => "Mathematics",
            DocumentCategory::ComputerScienceCoding => "Computer Science & Coding",
            DocumentCategory::Engineering => "Engineering",
            DocumentCategory::LanguageLearningLiterature => "Language Learning & Literature",
            DocumentCategory::GeneralOther => "General & Other",
        }
    }
}

/// An uploaded study document after the ingestion pipeline has validated,
/// categorized and vocabulary-extracted it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub category: DocumentCategory,
    pub content: String,
    pub vocabulary: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(
        owner_id: &str,
        title: &str,
        category: DocumentCategory,
        content: &str,
        vocabulary: Vec<String>,
    ) -> Self {
        Document {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            title: title.to_string(),
            category,
            content: content.to_string(),
            vocabulary,
            created_at: Some(Utc::now()),
            modified_at: Some(Utc::now()),
        }
    }
}
