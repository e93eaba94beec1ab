pub mod analyzer;
pub mod documents;
pub mod fuzzy;
pub mod linker;
pub mod matching;
pub mod status;

pub use analyzer::MatchAnalyzer;
pub use documents::DocumentService;
pub use fuzzy::{FuzzyLinker, FuzzyMatch};
pub use linker::{ExactLinker, MatchingDocuments};
pub use matching::{spawn_matching_worker, MatchRunOutcome, MatchingJobQueue, MatchingService};
pub use status::StatusCoordinator;
