//! mealcheck - conversational nutrition assistant
//!
//! A single-session workflow engine: a trainer collects your profile, a
//! nutritionist computes your targets, and a food specialist checks whether
//! a requested food fits them.

mod capabilities;
mod catalog;
mod runtime;
mod state_machine;

use capabilities::standard_registry;
use catalog::FoodCatalog;
use runtime::{ConsoleSink, RuntimeError, SessionRuntime, StdinSource};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), RuntimeError> {
    // Logs go to stderr so they never interleave with the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("MEALCHECK_LOG")
                .unwrap_or_else(|_| "mealcheck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    println!("=== mealcheck: nutrition assistant ===");
    println!("Trainer | Nutritionist | Food Specialist");
    println!("Type 'exit', 'quit', ':q' or 'bye' to end the session.");

    let catalog = Arc::new(FoodCatalog::builtin());
    let registry = standard_registry(catalog);
    let session = SessionRuntime::new(registry, StdinSource::new(), ConsoleSink);

    let report = session.run().await?;

    println!("\n=== SESSION COMPLETE ===");
    println!("Thank you for using mealcheck. Stay healthy!");

    if let Some(recommendation) = report.recommendation {
        println!("\nFINAL SUMMARY");
        println!("Recommendation: {}", recommendation.text);
        println!("Verdict: {}", recommendation.verdict.label());
    }

    Ok(())
}
