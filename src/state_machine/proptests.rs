//! Property-based tests for the session state machine
//!
//! These verify the core invariants across randomly generated states and
//! updates rather than hand-picked fixtures.

use super::input::{absorb_input, classify, InputKind, TERMINATION_TOKENS};
use super::routing::next_stage;
use super::state::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_sex() -> impl Strategy<Value = Sex> {
    prop_oneof![Just(Sex::Male), Just(Sex::Female)]
}

fn arb_activity() -> impl Strategy<Value = ActivityLevel> {
    prop_oneof![
        Just(ActivityLevel::Sedentary),
        Just(ActivityLevel::Light),
        Just(ActivityLevel::Moderate),
        Just(ActivityLevel::Active),
        Just(ActivityLevel::VeryActive),
    ]
}

fn arb_profile() -> impl Strategy<Value = UserProfile> {
    (
        proptest::option::of(1u32..=120),
        proptest::option::of(arb_sex()),
        proptest::option::of(80.0f64..=250.0),
        proptest::option::of(20.0f64..=400.0),
        proptest::option::of(arb_activity()),
        proptest::option::of(any::<bool>()),
    )
        .prop_map(
            |(age, sex, height_cm, weight_kg, activity_level, first_meal)| UserProfile {
                age,
                sex,
                height_cm,
                weight_kg,
                activity_level,
                first_meal,
            },
        )
}

fn arb_nutrition() -> impl Strategy<Value = Option<NutritionProfile>> {
    proptest::option::of((10.0f64..=60.0, 800u32..=4000).prop_map(|(bmi, target)| {
        NutritionProfile {
            bmi,
            bmi_class: BmiClass::from_bmi(bmi),
            bmr: 1500.0,
            tdee: 2000.0,
            target_calories: target,
            macros: MacroTargets {
                protein_g: 100.0,
                carbs_g: 130.0,
                fat_g: 43.0,
            },
            assessment: String::new(),
        }
    }))
}

fn arb_analysis() -> impl Strategy<Value = Option<FoodAnalysis>> {
    proptest::option::of(("[a-z]{1,12}", 1u32..=5, 1u32..=900).prop_map(
        |(item, quantity, calories_per_unit)| FoodAnalysis {
            item,
            quantity,
            calories_per_unit,
            total_calories: quantity * calories_per_unit,
            macros: MacroBreakdown {
                protein_g: 5.0,
                carbs_g: 15.0,
                fat_g: 3.0,
                fiber_g: 2.0,
                sugar_g: 8.0,
            },
            notes: String::new(),
        },
    ))
}

fn arb_recommendation() -> impl Strategy<Value = Option<Recommendation>> {
    proptest::option::of(("[a-zA-Z ]{0,40}", any::<bool>()).prop_map(|(text, can_eat)| {
        Recommendation {
            text,
            verdict: if can_eat {
                Verdict::CanEat
            } else {
                Verdict::BetterAvoid
            },
        }
    }))
}

fn arb_state() -> impl Strategy<Value = SessionState> {
    (
        (
            proptest::collection::vec("[a-zA-Z0-9 ]{0,30}", 0..6),
            "[a-zA-Z0-9 ]{0,40}",
            any::<bool>(),
            arb_profile(),
            arb_nutrition(),
        ),
        (
            proptest::option::of("[a-z ]{1,30}"),
            any::<bool>(),
            arb_analysis(),
            arb_recommendation(),
            any::<bool>(),
        ),
    )
        .prop_map(
            |(
                (entries, current_input, awaiting_input, profile, nutrition),
                (
                    food_request,
                    awaiting_food_request,
                    food_analysis,
                    recommendation,
                    complete_flag,
                ),
            )| {
                let mut state = SessionState::new();
                for entry in entries {
                    state.history.push(Message::new(Role::User, entry));
                }
                state.current_input = current_input;
                state.awaiting_input = awaiting_input;
                state.profile = profile;
                state.nutrition = nutrition;
                state.food_request = food_request;
                state.awaiting_food_request = awaiting_food_request;
                state.food_analysis = food_analysis;
                // Invariant (c): a recommendation implies completion
                state.session_complete = complete_flag || recommendation.is_some();
                state.recommendation = recommendation;
                state
            },
        )
}

fn arb_update() -> impl Strategy<Value = StateUpdate> {
    (
        proptest::collection::vec("[a-zA-Z ]{0,20}", 0..3),
        proptest::option::of("[a-zA-Z ]{0,20}"),
        proptest::option::of(any::<bool>()),
        proptest::option::of(arb_profile()),
        proptest::option::of("[a-z ]{1,20}"),
        arb_recommendation(),
        any::<bool>(),
    )
        .prop_map(
            |(
                entries,
                current_input,
                awaiting_input,
                profile,
                food_request,
                recommendation,
                session_complete,
            )| {
                let mut update = StateUpdate::new();
                for entry in entries {
                    update.messages.push(Message::new(Role::Trainer, entry));
                }
                update.current_input = current_input;
                update.awaiting_input = awaiting_input;
                update.profile = profile;
                update.food_request = food_request;
                update.recommendation = recommendation;
                update.session_complete = session_complete;
                update
            },
        )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Profile completeness is exactly "all six fields present". Fields are
    /// only ever stored post-validation, so presence implies validity.
    #[test]
    fn profile_complete_iff_all_fields_present(profile in arb_profile()) {
        let expected = profile.age.is_some()
            && profile.sex.is_some()
            && profile.height_cm.is_some()
            && profile.weight_kg.is_some()
            && profile.activity_level.is_some()
            && profile.first_meal.is_some();
        prop_assert_eq!(profile.is_complete(), expected);
    }

    /// Out-of-range values never land in the profile.
    #[test]
    fn setters_reject_out_of_range(age in any::<u32>(), height in -1000.0f64..2000.0, weight in -1000.0f64..2000.0) {
        let mut profile = UserProfile::default();
        prop_assert_eq!(profile.set_age(age), AGE_RANGE.contains(&age));
        prop_assert_eq!(profile.set_height_cm(height), HEIGHT_CM_RANGE.contains(&height));
        prop_assert_eq!(profile.set_weight_kg(weight), WEIGHT_KG_RANGE.contains(&weight));
        prop_assert_eq!(profile.age.is_some(), AGE_RANGE.contains(&age));
        prop_assert_eq!(profile.height_cm.is_some(), HEIGHT_CM_RANGE.contains(&height));
        prop_assert_eq!(profile.weight_kg.is_some(), WEIGHT_KG_RANGE.contains(&weight));
    }

    /// Routing is total (never panics) and deterministic.
    #[test]
    fn routing_is_total_and_deterministic(state in arb_state()) {
        let first = next_stage(&state);
        let second = next_stage(&state);
        prop_assert_eq!(first, second);
    }

    /// History length never decreases across a merge.
    #[test]
    fn history_is_append_only(state in arb_state(), update in arb_update()) {
        let before = state.history.len();
        let mut state = state;
        state.apply(update);
        prop_assert!(state.history.len() >= before);
    }

    /// Once complete, a session stays complete under any further update.
    #[test]
    fn session_complete_is_monotonic(state in arb_state(), update in arb_update()) {
        let mut state = state;
        state.session_complete = true;
        state.apply(update);
        prop_assert!(state.session_complete);
    }

    /// A stored recommendation is never replaced by a later merge.
    #[test]
    fn recommendation_is_write_once(state in arb_state(), update in arb_update()) {
        let mut state = state;
        let existing = state.recommendation.clone();
        state.apply(update.clone());
        if let Some(original) = existing {
            prop_assert_eq!(state.recommendation, Some(original));
        } else if update.recommendation.is_some() {
            prop_assert!(state.session_complete);
        }
    }

    /// Classification handles arbitrary input without panicking, and
    /// absorbing input always clears the suspension flag.
    #[test]
    fn classification_is_total(raw in "\\PC{0,60}") {
        let _ = classify(&raw);
        let state = SessionState::new();
        let update = absorb_input(&state, &raw);
        prop_assert_eq!(update.awaiting_input, Some(false));
    }

    /// Termination tokens end the session whatever the surrounding case or
    /// whitespace, and whatever state the session is in.
    #[test]
    fn termination_tokens_always_terminate(
        idx in 0usize..TERMINATION_TOKENS.len(),
        upper in any::<bool>(),
        state in arb_state(),
    ) {
        let token = TERMINATION_TOKENS[idx];
        let raw = if upper { format!("  {}  ", token.to_uppercase()) } else { format!(" {token} ") };
        prop_assert_eq!(classify(&raw), InputKind::Terminate);

        let mut state = state;
        let update = absorb_input(&state, &raw);
        state.apply(update);
        prop_assert!(state.session_complete);
    }
}
