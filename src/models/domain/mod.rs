pub mod delivery;
pub mod generation;
pub mod input;
pub mod task;

pub use delivery::{DeliveryTarget, DispatchOutcome};
pub use generation::{GenerationOptions, GenerationResult, Prompt};
pub use input::{InputKind, InputSource, NormalizedText};
pub use task::TaskKind;
