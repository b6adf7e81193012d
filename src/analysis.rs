use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight fixed ingredient classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Beneficial,
    Neutral,
    Questionable,
    Avoid,
    Allergen,
    Preservative,
    Sweetener,
    Stabilizer,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Beneficial,
        Category::Neutral,
        Category::Questionable,
        Category::Avoid,
        Category::Allergen,
        Category::Preservative,
        Category::Sweetener,
        Category::Stabilizer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Beneficial => "Beneficial",
            Category::Neutral => "Neutral",
            Category::Questionable => "Questionable",
            Category::Avoid => "Avoid",
            Category::Allergen => "Allergen",
            Category::Preservative => "Preservative",
            Category::Sweetener => "Sweetener",
            Category::Stabilizer => "Stabilizer",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Impact {
    Synergy,
    Conflict,
    Caution,
}

impl Impact {
    pub const ALL: [Impact; 3] = [Impact::Synergy, Impact::Conflict, Impact::Caution];

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Synergy => "Synergy",
            Impact::Conflict => "Conflict",
            Impact::Caution => "Caution",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientAnalysis {
    pub name: String,
    pub significance: String,
    pub trade_offs: String,
    pub category: Category,
}

/// A relationship between two or more ingredients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientInteraction {
    pub name: String,
    pub description: String,
    pub impact: Impact,
}

/// The provider's full analysis. Every field is required on the wire; a
/// response missing any of them fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub inferred_intent: String,
    pub reasoning_chain: String,
    pub ingredients: Vec<IngredientAnalysis>,
    pub ingredient_interactions: Vec<IngredientInteraction>,
    pub uncertainty_disclaimer: String,
    pub summary: String,
    pub suggested_action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Image,
    Text,
}

/// What the user submitted. For images `content` is bare base64 (no data-URL
/// prefix); for text it is the raw ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(rename = "type")]
    pub kind: InputKind,
    pub content: String,
}

impl AnalysisInput {
    pub fn image(base64: impl Into<String>) -> Self {
        Self {
            kind: InputKind::Image,
            content: base64.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: InputKind::Text,
            content: text.into(),
        }
    }
}
