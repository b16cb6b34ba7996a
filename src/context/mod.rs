pub mod engine;
pub mod imports;
pub mod related;
pub mod related_tests;
pub mod types;

pub use engine::ContextEngine;
pub use imports::{HeuristicResolver, ReferenceResolver};
pub use types::{RelatedContext, ResolvedFile};
