pub mod leonardo;
pub mod orchestrator;
pub mod profile;
pub mod provider;

pub use leonardo::LeonardoClient;
pub use orchestrator::GenerationOrchestrator;
pub use profile::{GenerationProfile, PollPolicy, ProfileKind, TransparencyDirective};
pub use provider::ImageProvider;
