//! Intent classification runtime built from exported artifacts.

pub mod classifier;
pub mod portable;
pub mod types;

pub use classifier::IntentClassifier;
pub use portable::PortableIntentModel;
pub use types::{ClassScore, IntentPrediction};
