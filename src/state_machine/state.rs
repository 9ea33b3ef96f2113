//! Session state types
//!
//! A single `SessionState` is threaded through every stage of a session.
//! Stages never mutate it directly; they return a `StateUpdate` that the
//! executor merges exactly once per step (see `SessionState::apply`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Conversation history
// ============================================================================

/// Who produced a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Trainer,
    Nutritionist,
    FoodSpecialist,
}

impl Role {
    /// Label used when echoing messages to the console
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Trainer => "Trainer",
            Role::Nutritionist => "Nutritionist",
            Role::FoodSpecialist => "Food Specialist",
        }
    }
}

/// One entry in the conversation history. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// User profile
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// TDEE multiplier for this activity level
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// Profile fields in the order the trainer collects them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Age,
    Sex,
    HeightCm,
    WeightKg,
    ActivityLevel,
    FirstMeal,
}

pub const REQUIRED_FIELDS: [ProfileField; 6] = [
    ProfileField::Age,
    ProfileField::Sex,
    ProfileField::HeightCm,
    ProfileField::WeightKg,
    ProfileField::ActivityLevel,
    ProfileField::FirstMeal,
];

pub const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=120;
pub const HEIGHT_CM_RANGE: std::ops::RangeInclusive<f64> = 80.0..=250.0;
pub const WEIGHT_KG_RANGE: std::ops::RangeInclusive<f64> = 20.0..=400.0;

/// User profile collected by the trainer stage.
///
/// Every field is optional until collected; a field is only ever stored after
/// passing its range check, so presence implies validity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: Option<u32>,
    pub sex: Option<Sex>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub first_meal: Option<bool>,
}

impl UserProfile {
    /// True iff all six required fields are present (and therefore valid)
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Required fields not yet collected, in collection order
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|f| !self.has(*f))
            .collect()
    }

    fn has(&self, field: ProfileField) -> bool {
        match field {
            ProfileField::Age => self.age.is_some(),
            ProfileField::Sex => self.sex.is_some(),
            ProfileField::HeightCm => self.height_cm.is_some(),
            ProfileField::WeightKg => self.weight_kg.is_some(),
            ProfileField::ActivityLevel => self.activity_level.is_some(),
            ProfileField::FirstMeal => self.first_meal.is_some(),
        }
    }

    /// Store an age if it passes the range check. Returns whether it was kept.
    pub fn set_age(&mut self, age: u32) -> bool {
        if AGE_RANGE.contains(&age) {
            self.age = Some(age);
            true
        } else {
            false
        }
    }

    pub fn set_height_cm(&mut self, height: f64) -> bool {
        if HEIGHT_CM_RANGE.contains(&height) {
            self.height_cm = Some(height);
            true
        } else {
            false
        }
    }

    pub fn set_weight_kg(&mut self, weight: f64) -> bool {
        if WEIGHT_KG_RANGE.contains(&weight) {
            self.weight_kg = Some(weight);
            true
        } else {
            false
        }
    }
}

// ============================================================================
// Derived records
// ============================================================================

/// BMI classification, WHO cutoffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiClass {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiClass::Underweight
        } else if bmi < 25.0 {
            BmiClass::Normal
        } else if bmi < 30.0 {
            BmiClass::Overweight
        } else {
            BmiClass::Obese
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BmiClass::Underweight => "underweight",
            BmiClass::Normal => "normal",
            BmiClass::Overweight => "overweight",
            BmiClass::Obese => "obese",
        }
    }
}

/// Daily macro targets in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Output of the nutritionist stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionProfile {
    pub bmi: f64,
    pub bmi_class: BmiClass,
    pub bmr: f64,
    pub tdee: f64,
    pub target_calories: u32,
    pub macros: MacroTargets,
    pub assessment: String,
}

/// Estimated macro content of an analyzed food item, in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroBreakdown {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub sugar_g: f64,
}

/// Output of the food specialist stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodAnalysis {
    pub item: String,
    pub quantity: u32,
    pub calories_per_unit: u32,
    pub total_calories: u32,
    pub macros: MacroBreakdown,
    pub notes: String,
}

/// Binary verdict attached to the final recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    CanEat,
    BetterAvoid,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::CanEat => "CAN EAT",
            Verdict::BetterAvoid => "BETTER AVOID",
        }
    }
}

/// Final recommendation. Set at most once; setting it completes the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub verdict: Verdict,
}

/// Informational phase marker. Routing never reads this; it derives every
/// decision from the underlying fields so the two cannot diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Greeting,
    ProfileCollection,
    NutritionAnalysis,
    FoodAnalysis,
    Recommendation,
    Complete,
}

// ============================================================================
// Session state
// ============================================================================

/// The mutable session record. Exclusively owned by the executor loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    /// Append-only conversation history
    pub history: Vec<Message>,
    /// Last raw external input; replaced each suspension cycle
    pub current_input: String,
    /// True only while execution is paused at the suspension boundary
    pub awaiting_input: bool,
    pub profile: UserProfile,
    pub nutrition: Option<NutritionProfile>,
    pub food_request: Option<String>,
    /// True once the trainer has prompted for a food item
    pub awaiting_food_request: bool,
    pub food_analysis: Option<FoodAnalysis>,
    pub phase: Phase,
    pub recommendation: Option<Recommendation>,
    /// Monotonic: once true, never reset
    pub session_complete: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            history: Vec::new(),
            current_input: String::new(),
            awaiting_input: false,
            profile: UserProfile::default(),
            nutrition: None,
            food_request: None,
            awaiting_food_request: false,
            food_analysis: None,
            phase: Phase::default(),
            recommendation: None,
            session_complete: false,
        }
    }

    /// Derived, never stored: complete iff all six fields present and valid
    pub fn profile_complete(&self) -> bool {
        self.profile.is_complete()
    }

    /// Merge a partial update into the state.
    ///
    /// History is appended, never replaced. `session_complete` is monotonic.
    /// A recommendation can only be set once; later attempts are dropped.
    pub fn apply(&mut self, update: StateUpdate) {
        self.history.extend(update.messages);
        if let Some(input) = update.current_input {
            self.current_input = input;
        }
        if let Some(awaiting) = update.awaiting_input {
            self.awaiting_input = awaiting;
        }
        if let Some(profile) = update.profile {
            self.profile = profile;
        }
        if let Some(nutrition) = update.nutrition {
            self.nutrition = Some(nutrition);
        }
        if let Some(request) = update.food_request {
            self.food_request = Some(request);
        }
        if let Some(awaiting) = update.awaiting_food_request {
            self.awaiting_food_request = awaiting;
        }
        if let Some(analysis) = update.food_analysis {
            self.food_analysis = Some(analysis);
        }
        if let Some(phase) = update.phase {
            self.phase = phase;
        }
        if let Some(rec) = update.recommendation {
            if self.recommendation.is_none() {
                self.recommendation = Some(rec);
                self.session_complete = true;
            }
        }
        if update.session_complete {
            self.session_complete = true;
        }
    }
}

// ============================================================================
// Partial update
// ============================================================================

/// Partial update returned by a stage. Absent fields leave the state
/// untouched; `messages` is concatenated onto the history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub current_input: Option<String>,
    pub awaiting_input: Option<bool>,
    pub profile: Option<UserProfile>,
    pub nutrition: Option<NutritionProfile>,
    pub food_request: Option<String>,
    pub awaiting_food_request: Option<bool>,
    pub food_analysis: Option<FoodAnalysis>,
    pub phase: Option<Phase>,
    pub recommendation: Option<Recommendation>,
    pub session_complete: bool,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn awaiting_input(mut self, awaiting: bool) -> Self {
        self.awaiting_input = Some(awaiting);
        self
    }

    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    pub fn complete_session(mut self) -> Self {
        self.session_complete = true;
        self
    }
}
