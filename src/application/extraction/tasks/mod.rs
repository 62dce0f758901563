mod scope;
mod section;
mod summary;

pub use scope::ScopeTask;
pub use section::SectionTask;
pub use summary::SummaryTask;
