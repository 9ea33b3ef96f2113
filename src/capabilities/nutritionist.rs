//! Nutritionist stage
//!
//! Computes the nutrition profile from the collected user profile (BMI,
//! Mifflin-St Jeor BMR, TDEE, a weight-loss calorie target, and macro
//! targets). Re-invoked for general meal-planning questions once a profile
//! already exists.

use crate::runtime::traits::{Capability, StageOutput};
use crate::state_machine::input::is_meal_planning_request;
use crate::state_machine::state::{
    BmiClass, MacroTargets, NutritionProfile, Phase, SessionState, Sex, StateUpdate, UserProfile,
};
use async_trait::async_trait;

/// Daily deficit applied to TDEE for the weight-loss target
const TARGET_DEFICIT: f64 = 500.0;
/// Floor for the calorie target
const MIN_TARGET_CALORIES: u32 = 1200;

pub struct Nutritionist;

#[async_trait]
impl Capability for Nutritionist {
    async fn run(&self, state: &SessionState) -> StageOutput {
        if state.nutrition.is_some() && is_meal_planning_request(&state.current_input) {
            return planning_advice(state);
        }
        analyze_profile(&state.profile)
    }
}

// ============================================================================
// Metric computation
// ============================================================================

fn analyze_profile(profile: &UserProfile) -> StageOutput {
    let nutrition = compute_metrics(profile).unwrap_or_else(fallback_metrics);

    let message = format!(
        "Based on your profile: BMI {} ({}), BMR {} cal/day, TDEE {} cal/day. \
         Target: {} cal/day for weight loss. {}",
        nutrition.bmi,
        nutrition.bmi_class.as_str(),
        nutrition.bmr,
        nutrition.tdee,
        nutrition.target_calories,
        nutrition.assessment,
    );

    let mut update = StateUpdate::new()
        .awaiting_input(false)
        .phase(Phase::NutritionAnalysis);
    update.nutrition = Some(nutrition);

    StageOutput::new(update).with_message(message)
}

/// None when a required field is missing; the caller substitutes the
/// conservative fallback profile instead of failing the step.
fn compute_metrics(profile: &UserProfile) -> Option<NutritionProfile> {
    let weight = profile.weight_kg?;
    let height_cm = profile.height_cm?;
    let age = profile.age?;
    let sex = profile.sex?;
    let activity = profile.activity_level?;

    let height_m = height_cm / 100.0;
    let bmi = round2(weight / (height_m * height_m));
    let bmi_class = BmiClass::from_bmi(bmi);

    // Mifflin-St Jeor
    let bmr = 10.0 * weight + 6.25 * height_cm - 5.0 * f64::from(age)
        + match sex {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        };
    let tdee = bmr * activity.multiplier();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let target_calories = ((tdee - TARGET_DEFICIT).round().max(0.0) as u32).max(MIN_TARGET_CALORIES);

    let macros = MacroTargets {
        protein_g: round1(weight * 1.6),
        carbs_g: round1(f64::from(target_calories) * 0.4 / 4.0),
        fat_g: round1(f64::from(target_calories) * 0.3 / 9.0),
    };

    Some(NutritionProfile {
        bmi,
        bmi_class,
        bmr: round1(bmr),
        tdee: round1(tdee),
        target_calories,
        macros,
        assessment: assessment_for(bmi_class).to_string(),
    })
}

fn fallback_metrics() -> NutritionProfile {
    NutritionProfile {
        bmi: 22.0,
        bmi_class: BmiClass::Normal,
        bmr: 1500.0,
        tdee: 1800.0,
        target_calories: 1300,
        macros: MacroTargets {
            protein_g: 100.0,
            carbs_g: 130.0,
            fat_g: 43.0,
        },
        assessment: "Unable to calculate precise metrics due to missing data.".to_string(),
    }
}

fn assessment_for(class: BmiClass) -> &'static str {
    match class {
        BmiClass::Underweight => {
            "Your BMI indicates you're underweight. Focus on healthy weight gain with \
             nutrient-dense foods."
        }
        BmiClass::Normal => {
            "Great! Your BMI is in the healthy range. Maintain this with balanced nutrition \
             and regular exercise."
        }
        BmiClass::Overweight => {
            "Your BMI indicates you're overweight. A gradual weight loss approach will help \
             you reach a healthier weight."
        }
        BmiClass::Obese => {
            "Your BMI indicates obesity. Consider consulting a healthcare provider for a \
             comprehensive weight management plan."
        }
    }
}

// ============================================================================
// Meal-planning advice
// ============================================================================

fn planning_advice(state: &SessionState) -> StageOutput {
    let message = match state.nutrition.as_ref() {
        Some(n) => format!(
            "For meal planning, spread about {} calories across the day: roughly {}g \
             protein, {}g carbs, and {}g fat. Go for lean protein, wholegrains, and \
             vegetables, and keep fried food to once in a while lah.",
            n.target_calories, n.macros.protein_g, n.macros.carbs_g, n.macros.fat_g,
        ),
        None => "Let me work out your numbers first before planning meals.".to_string(),
    };

    // Consume the input so the meal-planning guard cannot re-fire on the
    // same question.
    let mut update = StateUpdate::new().awaiting_input(true);
    update.current_input = Some(String::new());

    StageOutput::new(update).with_message(message)
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
