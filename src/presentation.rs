use std::fmt::Write as _;

use crate::analysis::{AnalysisResult, Category, Impact, IngredientAnalysis};

/// Ingredients whose name contains `search` (case-insensitive), in their
/// original order. An empty term matches everything.
pub fn filter_ingredients<'a>(
    ingredients: &'a [IngredientAnalysis],
    search: &str,
) -> Vec<&'a IngredientAnalysis> {
    let needle = search.to_lowercase();
    ingredients
        .iter()
        .filter(|ing| ing.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn category_tag(category: Category) -> String {
    format!("[{}]", category.as_str().to_uppercase())
}

pub fn impact_badge(impact: Impact) -> String {
    format!("[{}]", impact.as_str().to_uppercase())
}

/// A result plus the live search term. Borrowing keeps the result immutable.
#[derive(Debug, Clone)]
pub struct ResultView<'a> {
    result: &'a AnalysisResult,
    search: String,
}

impl<'a> ResultView<'a> {
    pub fn new(result: &'a AnalysisResult) -> Self {
        Self {
            result,
            search: String::new(),
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn visible_ingredients(&self) -> Vec<&'a IngredientAnalysis> {
        filter_ingredients(&self.result.ingredients, &self.search)
    }

    /// `Some` message when the filter leaves nothing to show.
    pub fn no_matches_message(&self) -> Option<String> {
        if self.visible_ingredients().is_empty() {
            Some(format!("No ingredients found matching \"{}\"", self.search))
        } else {
            None
        }
    }

    pub fn context_inference(&self) -> String {
        format!(
            "Based on what I see, {}",
            self.result.inferred_intent.to_lowercase()
        )
    }

    pub fn render(&self, preview_url: Option<&str>) -> String {
        let r = self.result;
        let mut out = String::new();

        if let Some(url) = preview_url {
            let mime = url
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .unwrap_or("image");
            let _ = writeln!(out, "Scanned label ({})\n", mime);
        }

        let _ = writeln!(out, "CONTEXT INFERENCE");
        let _ = writeln!(out, "  \"{}\"\n", self.context_inference());

        let _ = writeln!(out, "THE VERDICT");
        let _ = writeln!(out, "  {}\n", r.summary);
        let _ = writeln!(out, "SUGGESTED MOTION");
        let _ = writeln!(out, "  {}\n", r.suggested_action);

        let _ = writeln!(out, "KEY INGREDIENTS REASONING");
        if !self.search.is_empty() {
            let _ = writeln!(out, "  (search: \"{}\")", self.search);
        }
        match self.no_matches_message() {
            Some(message) => {
                let _ = writeln!(out, "  {}", message);
            }
            None => {
                for ing in self.visible_ingredients() {
                    let _ = writeln!(out, "  {} {}", ing.name, category_tag(ing.category));
                    let _ = writeln!(out, "    The Why: {}", ing.significance);
                    let _ = writeln!(out, "    Trade-off: {}", ing.trade_offs);
                }
            }
        }
        out.push('\n');

        if !r.ingredient_interactions.is_empty() {
            let _ = writeln!(out, "SYNERGIES & CONFLICTS");
            for inter in &r.ingredient_interactions {
                let _ = writeln!(out, "  {} {}", inter.name, impact_badge(inter.impact));
                let _ = writeln!(out, "    {}", inter.description);
            }
            out.push('\n');
        }

        let _ = writeln!(out, "Logic Path: {}", r.reasoning_chain);
        let _ = writeln!(out, "{}", r.uncertainty_disclaimer);
        out
    }
}
