//! Trainer stage
//!
//! Handles three sub-behaviors, selected from the state: profile collection
//! (including the opening greeting), prompting for a food item once metrics
//! exist, and the final recommendation once an analysis is in.

use crate::runtime::traits::{Capability, StageOutput};
use crate::state_machine::state::{
    ActivityLevel, FoodAnalysis, NutritionProfile, Phase, ProfileField, Recommendation, Role, Sex,
    SessionState, StateUpdate, UserProfile, Verdict,
};
use async_trait::async_trait;

/// A single meal should stay within this share of the daily calorie target
const MEAL_SHARE_OF_TARGET: f64 = 0.3;

pub struct Trainer;

#[async_trait]
impl Capability for Trainer {
    async fn run(&self, state: &SessionState) -> StageOutput {
        if let (Some(nutrition), Some(analysis)) =
            (state.nutrition.as_ref(), state.food_analysis.as_ref())
        {
            if state.profile_complete() && state.recommendation.is_none() {
                return final_recommendation(nutrition, analysis);
            }
        }

        if state.profile_complete() && state.nutrition.is_some() && state.food_request.is_none() {
            return food_prompt(state.nutrition.as_ref());
        }

        collect_profile(state)
    }
}

// ============================================================================
// Final recommendation
// ============================================================================

fn final_recommendation(nutrition: &NutritionProfile, analysis: &FoodAnalysis) -> StageOutput {
    let target = nutrition.target_calories;
    let food_calories = analysis.total_calories;
    let can_eat = f64::from(food_calories) <= f64::from(target) * MEAL_SHARE_OF_TARGET;

    let verdict = if can_eat {
        Verdict::CanEat
    } else {
        Verdict::BetterAvoid
    };

    let message = format!(
        "Based on your target of {target} calories per day, {} comes to {food_calories} calories. {}",
        analysis.item,
        if can_eat {
            "Can eat lah!"
        } else {
            "Better reduce a bit lor."
        }
    );

    let mut update = StateUpdate::new()
        .awaiting_input(false)
        .phase(Phase::Complete)
        .complete_session();
    update.recommendation = Some(Recommendation {
        text: format!(
            "{} ({food_calories} cal) against a {target} cal/day target: {}.",
            analysis.item,
            if can_eat { "approved" } else { "not recommended" }
        ),
        verdict,
    });

    StageOutput::new(update).with_message(message)
}

// ============================================================================
// Food prompt
// ============================================================================

fn food_prompt(nutrition: Option<&NutritionProfile>) -> StageOutput {
    let target = nutrition.map_or(2000, |n| n.target_calories);
    let message = format!(
        "Now I know your nutritional needs - aim for about {target} calories per day. \
         What food would you like me to check? You can ask about apples, bananas, \
         cappuccino, toast, ham, or cheese!"
    );

    let mut update = StateUpdate::new().awaiting_input(true);
    update.awaiting_food_request = Some(true);

    StageOutput::new(update).with_message(message)
}

// ============================================================================
// Profile collection
// ============================================================================

fn collect_profile(state: &SessionState) -> StageOutput {
    // First contact: greet and ask the first question.
    let greeted = state.history.iter().any(|m| m.role == Role::Trainer);
    if !greeted {
        let update = StateUpdate::new()
            .awaiting_input(true)
            .phase(Phase::ProfileCollection);
        return StageOutput::new(update).with_message(
            "Hi there! I'm your fitness trainer lah! Let's see if you can eat that food. \
             First, tell me your age?",
        );
    }

    let mut profile = state.profile.clone();
    let input = state.current_input.trim();

    let rejected = match profile.missing_fields().first() {
        Some(&field) if !input.is_empty() => !parse_field(&mut profile, field, input),
        _ => false,
    };

    let missing = profile.missing_fields();
    let mut update = StateUpdate::new().phase(Phase::ProfileCollection);
    update.profile = Some(profile);

    match missing.first() {
        None => {
            update.awaiting_input = Some(false);
            StageOutput::new(update).with_message(
                "Steady lah, that's everything I need! Let me pass you to our nutritionist.",
            )
        }
        Some(&field) => {
            update.awaiting_input = Some(true);
            let question = question_for(field);
            let message = if rejected {
                format!("Hmm, that doesn't look right leh. {question}")
            } else {
                question.to_string()
            };
            StageOutput::new(update).with_message(message)
        }
    }
}

fn question_for(field: ProfileField) -> &'static str {
    match field {
        ProfileField::Age => "Tell me your age?",
        ProfileField::Sex => "Are you male or female?",
        ProfileField::HeightCm => "What's your height in cm?",
        ProfileField::WeightKg => "What's your current weight in kg?",
        ProfileField::ActivityLevel => {
            "How active are you? (sedentary/light/moderate/active/very_active)"
        }
        ProfileField::FirstMeal => "Is this your first meal of the day?",
    }
}

/// Parse the answer to the field we just asked about. Returns false when the
/// value is unparseable or fails its range check; the field is then dropped
/// and the prior stored value (or absence) retained.
fn parse_field(profile: &mut UserProfile, field: ProfileField, input: &str) -> bool {
    let lowered = input.to_lowercase();
    match field {
        ProfileField::Age => first_number(input)
            .map(|n| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let age = n.round() as u32;
                n >= 0.0 && profile.set_age(age)
            })
            .unwrap_or(false),
        ProfileField::Sex => {
            // "female" contains "male", so check it first
            if lowered.contains("female") || lowered.contains("woman") {
                profile.sex = Some(Sex::Female);
                true
            } else if lowered.contains("male") || lowered.contains("man") {
                profile.sex = Some(Sex::Male);
                true
            } else {
                false
            }
        }
        ProfileField::HeightCm => first_number(input)
            .map(|h| profile.set_height_cm(h))
            .unwrap_or(false),
        ProfileField::WeightKg => first_number(input)
            .map(|w| profile.set_weight_kg(w))
            .unwrap_or(false),
        ProfileField::ActivityLevel => {
            let level = if lowered.contains("very active") || lowered.contains("very_active") {
                Some(ActivityLevel::VeryActive)
            } else if lowered.contains("sedentary") {
                Some(ActivityLevel::Sedentary)
            } else if lowered.contains("light") {
                Some(ActivityLevel::Light)
            } else if lowered.contains("moderate") {
                Some(ActivityLevel::Moderate)
            } else if lowered.contains("active") {
                Some(ActivityLevel::Active)
            } else {
                None
            };
            match level {
                Some(l) => {
                    profile.activity_level = Some(l);
                    true
                }
                None => false,
            }
        }
        ProfileField::FirstMeal => {
            let words: Vec<&str> = lowered.split_whitespace().collect();
            if words.iter().any(|w| matches!(*w, "yes" | "y" | "yeah" | "yep" | "true"))
                || lowered.contains("first")
            {
                profile.first_meal = Some(true);
                true
            } else if words.iter().any(|w| matches!(*w, "no" | "n" | "nope" | "false"))
                || lowered.contains("not ")
            {
                profile.first_meal = Some(false);
                true
            } else {
                false
            }
        }
    }
}

/// First numeric token in the input, so "I'm 25" and "178cm" both work
fn first_number(input: &str) -> Option<f64> {
    let mut current = String::new();
    for ch in input.chars() {
        if ch.is_ascii_digit() || (ch == '.' && !current.is_empty() && !current.contains('.')) {
            current.push(ch);
        } else if !current.is_empty() {
            break;
        }
    }
    if current.is_empty() {
        None
    } else {
        current.parse().ok()
    }
}
