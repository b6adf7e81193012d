use std::collections::BTreeMap;

use crate::analysis::{AnalysisInput, Category, Impact, InputKind};
use crate::api_connection::endpoints::{
    Content, GenerateContentRequest, GenerationConfig, Part, ResponseSchema, ThinkingConfig,
};

pub const IMAGE_MIME_TYPE: &str = "image/jpeg";
pub const ANALYSIS_TEMPERATURE: f32 = 0.2;
pub const THINKING_BUDGET: u32 = 4000;
pub const RESPONSE_MIME_TYPE: &str = "application/json";

pub const IMAGE_PROMPT: &str = "Identify the food packaging or ingredients list in this image. \
Do not just OCR; think about why a health-conscious user would be scanning this. \
Infer their goal (weight loss, allergy check, general longevity, or metabolic health) and explain the trade-offs of the found ingredients. \
Categorize each ingredient specifically as Beneficial, Neutral, Questionable, Avoid, Allergen, Preservative, Sweetener, or Stabilizer. \
Crucially, identify any potential interactions between ingredients (e.g., how a sweetener might affect nutrient absorption or how preservatives impact gut health when combined with other compounds).";

pub fn text_prompt(ingredients: &str) -> String {
    format!(
        "The user provided the following ingredients list: {}. \
Analyze this from a health-co-pilot perspective, identifying specific categories and potential interactions between ingredients (synergies or conflicts).",
        ingredients
    )
}

fn string_field(description: Option<&str>) -> ResponseSchema {
    ResponseSchema {
        schema_type: "STRING".to_string(),
        description: description.map(str::to_string),
        r#enum: None,
        properties: None,
        items: None,
        required: None,
    }
}

fn enum_field(values: impl IntoIterator<Item = &'static str>) -> ResponseSchema {
    ResponseSchema {
        r#enum: Some(values.into_iter().map(str::to_string).collect()),
        ..string_field(None)
    }
}

fn object(
    description: Option<&str>,
    fields: Vec<(&str, ResponseSchema)>,
) -> ResponseSchema {
    let required = fields.iter().map(|(name, _)| name.to_string()).collect();
    let properties: BTreeMap<String, ResponseSchema> = fields
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect();
    ResponseSchema {
        schema_type: "OBJECT".to_string(),
        description: description.map(str::to_string),
        r#enum: None,
        properties: Some(properties),
        items: None,
        required: Some(required),
    }
}

fn array_of(description: Option<&str>, items: ResponseSchema) -> ResponseSchema {
    ResponseSchema {
        schema_type: "ARRAY".to_string(),
        description: description.map(str::to_string),
        r#enum: None,
        properties: None,
        items: Some(Box::new(items)),
        required: None,
    }
}

/// Output schema mirroring `AnalysisResult`. Every property at every level is
/// required and `category`/`impact` are closed enums.
pub fn analysis_response_schema() -> ResponseSchema {
    let ingredient = object(
        None,
        vec![
            ("name", string_field(None)),
            ("significance", string_field(Some("Why this matters biologically."))),
            ("tradeOffs", string_field(Some("The good vs bad balance."))),
            ("category", enum_field(Category::ALL.iter().map(Category::as_str))),
        ],
    );

    let interaction = object(
        None,
        vec![
            (
                "name",
                string_field(Some("The name of the interaction or compound group.")),
            ),
            (
                "description",
                string_field(Some(
                    "Explanation of how these ingredients interact (e.g., impact on absorption, gut health).",
                )),
            ),
            ("impact", enum_field(Impact::ALL.iter().map(Impact::as_str))),
        ],
    );

    object(
        None,
        vec![
            (
                "inferredIntent",
                string_field(Some(
                    "A short sentence about what you think the user is looking for based on context.",
                )),
            ),
            (
                "reasoningChain",
                string_field(Some("Your internal logic on why certain ingredients are flagged.")),
            ),
            ("ingredients", array_of(None, ingredient)),
            (
                "ingredientInteractions",
                array_of(
                    Some("Subtle interactions between the found ingredients."),
                    interaction,
                ),
            ),
            (
                "uncertaintyDisclaimer",
                string_field(Some("Express your uncertainty in natural language.")),
            ),
            (
                "summary",
                string_field(Some("A human-like summary of the health impact.")),
            ),
            ("suggestedAction", string_field(Some("A gentle recommendation."))),
        ],
    )
}

pub fn analysis_generation_config() -> GenerationConfig {
    GenerationConfig {
        temperature: Some(ANALYSIS_TEMPERATURE),
        thinking_config: Some(ThinkingConfig {
            thinking_budget: THINKING_BUDGET,
        }),
        response_mime_type: Some(RESPONSE_MIME_TYPE.to_string()),
        response_schema: Some(analysis_response_schema()),
    }
}

/// Builds the provider request for one input. Pure: no I/O, no validation of
/// the content itself.
pub fn build_analysis_request(input: &AnalysisInput, model: &str) -> GenerateContentRequest {
    let parts = match input.kind {
        InputKind::Image => vec![
            Part::inline_image(IMAGE_MIME_TYPE, input.content.clone()),
            Part::text(IMAGE_PROMPT),
        ],
        InputKind::Text => vec![Part::text(text_prompt(&input.content))],
    };

    GenerateContentRequest {
        model: model.to_string(),
        contents: vec![Content { parts }],
        generation_config: analysis_generation_config(),
    }
}
