//! Food specialist stage
//!
//! Resolves the pending food request against the catalog and produces a
//! `FoodAnalysis`. A lookup miss degrades to a conservative estimate; this
//! stage never fails a step.

use crate::catalog::{FoodCatalog, FoodMatch};
use crate::runtime::traits::{Capability, StageOutput};
use crate::state_machine::state::{
    FoodAnalysis, MacroBreakdown, Phase, SessionState, StateUpdate,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Calories assumed for an item the catalog doesn't know
const FALLBACK_CALORIES: u32 = 100;

pub struct FoodSpecialist {
    catalog: Arc<FoodCatalog>,
}

impl FoodSpecialist {
    pub fn new(catalog: Arc<FoodCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Capability for FoodSpecialist {
    async fn run(&self, state: &SessionState) -> StageOutput {
        let Some(request) = state.food_request.as_deref() else {
            // Shouldn't be routed here without a request; ask for one.
            return StageOutput::new(StateUpdate::new().awaiting_input(true)).with_message(
                "I need to know what food you want me to check! \
                 Please tell me what you'd like to eat.",
            );
        };

        let (analysis, message) = match self.catalog.lookup(request) {
            Some(hit) => analyzed(&hit, state),
            None => estimated(request, state),
        };

        let mut update = StateUpdate::new()
            .awaiting_input(false)
            .phase(Phase::FoodAnalysis);
        update.food_analysis = Some(analysis);

        StageOutput::new(update).with_message(message)
    }
}

fn analyzed(hit: &FoodMatch, state: &SessionState) -> (FoodAnalysis, String) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let per_unit = hit.calories_per_unit.round() as u32;

    let analysis = FoodAnalysis {
        item: hit.canonical_name.clone(),
        quantity: hit.quantity,
        calories_per_unit: per_unit,
        total_calories: hit.calories_total,
        macros: estimate_macros(hit.calories_total),
        notes: format!(
            "{}: about {per_unit} calories per unit.",
            hit.canonical_name
        ),
    };

    let message = format!(
        "{} x {} comes to about {} calories{}",
        hit.quantity,
        hit.canonical_name,
        hit.calories_total,
        daily_share_suffix(hit.calories_total, state),
    );

    (analysis, message)
}

fn estimated(request: &str, state: &SessionState) -> (FoodAnalysis, String) {
    let analysis = FoodAnalysis {
        item: request.to_string(),
        quantity: 1,
        calories_per_unit: FALLBACK_CALORIES,
        total_calories: FALLBACK_CALORIES,
        macros: estimate_macros(FALLBACK_CALORIES),
        notes: format!(
            "Estimated nutritional content for {request}. \
             Approximately {FALLBACK_CALORIES} calories."
        ),
    };

    let message = format!(
        "I couldn't find \"{request}\" in my catalog, so here's a general estimate: \
         about {FALLBACK_CALORIES} calories{}. Actual values may vary with preparation \
         and portion size.",
        daily_share_suffix(FALLBACK_CALORIES, state),
    );

    (analysis, message)
}

/// Rough macro split scaled from a per-100-calorie baseline
fn estimate_macros(total_calories: u32) -> MacroBreakdown {
    let scale = f64::from(total_calories) / 100.0;
    MacroBreakdown {
        protein_g: round1(5.0 * scale),
        carbs_g: round1(15.0 * scale),
        fat_g: round1(3.0 * scale),
        fiber_g: round1(2.0 * scale),
        sugar_g: round1(8.0 * scale),
    }
}

fn daily_share_suffix(calories: u32, state: &SessionState) -> String {
    match state.nutrition.as_ref() {
        Some(n) if n.target_calories > 0 => {
            let pct = round1(f64::from(calories) / f64::from(n.target_calories) * 100.0);
            format!(" ({pct}% of your daily target)")
        }
        _ => String::new(),
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::state::{BmiClass, MacroTargets, NutritionProfile};

    fn specialist() -> FoodSpecialist {
        FoodSpecialist::new(Arc::new(FoodCatalog::builtin()))
    }

    fn state_with_request(request: &str) -> SessionState {
        let mut state = SessionState::new();
        state.food_request = Some(request.to_string());
        state.nutrition = Some(NutritionProfile {
            bmi: 22.0,
            bmi_class: BmiClass::Normal,
            bmr: 1500.0,
            tdee: 2000.0,
            target_calories: 2000,
            macros: MacroTargets {
                protein_g: 100.0,
                carbs_g: 130.0,
                fat_g: 43.0,
            },
            assessment: String::new(),
        });
        state
    }

    #[tokio::test]
    async fn known_food_is_analyzed_from_the_catalog() {
        let state = state_with_request("3 banana");
        let output = specialist().run(&state).await;

        let analysis = output.update.food_analysis.unwrap();
        assert_eq!(analysis.item, "banana");
        assert_eq!(analysis.quantity, 3);
        assert_eq!(analysis.total_calories, 267);
        assert!(output.message.unwrap().contains("267"));
    }

    #[tokio::test]
    async fn unknown_food_gets_a_conservative_estimate() {
        let state = state_with_request("durian puff");
        let output = specialist().run(&state).await;

        let analysis = output.update.food_analysis.unwrap();
        assert_eq!(analysis.total_calories, FALLBACK_CALORIES);
        assert_eq!(analysis.item, "durian puff");
        let message = output.message.unwrap();
        assert!(message.contains("couldn't find"));
        // 100 of 2000 = 5%
        assert!(message.contains("5%"));
    }

    #[tokio::test]
    async fn missing_request_asks_instead_of_failing() {
        let state = SessionState::new();
        let output = specialist().run(&state).await;
        assert!(output.update.food_analysis.is_none());
        assert_eq!(output.update.awaiting_input, Some(true));
    }

    #[tokio::test]
    async fn consumption_phrase_request_still_matches_the_food_term() {
        // The raw request text is the query; substring matching finds the food
        let state = state_with_request("can i eat a banana");
        let output = specialist().run(&state).await;
        let analysis = output.update.food_analysis.unwrap();
        assert_eq!(analysis.item, "banana");
        assert_eq!(analysis.total_calories, 89);
    }
}
