mod scope;
mod section;
mod summary;

pub use scope::{ProjectOverview, ScopeOfWork, TechnicalStandard, WorkComponent};
pub use section::{KeyConsideration, SectionAnalysis, SectionReport};
pub use summary::{
    DateEntry, ELIGIBILITY_LIMIT, FinancialRequirements, ImportantDates, RiskAnalysis, RiskEntry,
    TenderSummary,
};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A structured shape the extraction pipeline can produce.
///
/// The pipeline is schema-agnostic: it needs an always-available empty
/// placeholder, an emptiness test to reject vacuous model output, and a
/// deterministic merge of per-chunk partial values. Everything else about a
/// shape lives in its own type.
pub trait ExtractionValue:
    Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Placeholder returned when nothing could be extracted. Always
    /// well-typed, so responses carry a real value even on total failure.
    fn empty() -> Self;

    /// True when the value carries no extracted content at all. An empty
    /// value parsed out of model output counts as an extraction failure.
    fn is_empty(&self) -> bool;

    /// Deterministic merge of partial values in encounter order. Never
    /// fails; merging only empty partials yields the empty value.
    fn merge(partials: Vec<Self>) -> Self;
}
