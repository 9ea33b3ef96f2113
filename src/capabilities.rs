//! Processing-stage implementations
//!
//! Each capability is a deterministic, total implementation of the
//! `Capability` contract; the executor depends on them only through the
//! trait, so tests can swap in stand-ins.

mod food_specialist;
mod nutritionist;
mod trainer;

pub use food_specialist::FoodSpecialist;
pub use nutritionist::Nutritionist;
pub use trainer::Trainer;

use crate::catalog::FoodCatalog;
use crate::runtime::CapabilityRegistry;
use crate::state_machine::Stage;
use std::sync::Arc;

/// Registry with the three standard stages wired up
pub fn standard_registry(catalog: Arc<FoodCatalog>) -> CapabilityRegistry {
    CapabilityRegistry::new()
        .register(Stage::Trainer, Arc::new(Trainer))
        .register(Stage::Nutritionist, Arc::new(Nutritionist))
        .register(Stage::FoodSpecialist, Arc::new(FoodSpecialist::new(catalog)))
}
