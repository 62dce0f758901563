use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ExtractionValue;
use crate::domain::merge::{composite_key, keep_first_non_empty, keep_longest, normalize_key};

/// Merged eligibility highlights are capped at this many entries.
pub const ELIGIBILITY_LIMIT: usize = 4;

/// One-page tender summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TenderSummary {
    pub project_overview: String,
    pub eligibility_highlights: Vec<String>,
    pub important_dates: ImportantDates,
    pub financial_requirements: FinancialRequirements,
    pub risk_analysis: RiskAnalysis,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportantDates {
    pub pre_bid_queries: String,
    pub bid_submission: String,
    pub other_dates: Vec<DateEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DateEntry {
    pub name: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialRequirements {
    pub contract_value: String,
    pub document_fees: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskAnalysis {
    pub penalty_risk: String,
    pub other_risks: Vec<RiskEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskEntry {
    pub name: String,
    pub detail: String,
}

impl ExtractionValue for TenderSummary {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.project_overview.is_empty()
            && self.eligibility_highlights.is_empty()
            && self.important_dates.pre_bid_queries.is_empty()
            && self.important_dates.bid_submission.is_empty()
            && self.important_dates.other_dates.is_empty()
            && self.financial_requirements.contract_value.is_empty()
            && self.financial_requirements.document_fees.is_empty()
            && self.risk_analysis.penalty_risk.is_empty()
            && self.risk_analysis.other_risks.is_empty()
    }

    /// Longest project overview wins; eligibility highlights are deduplicated
    /// case-insensitively in first-seen order and capped at
    /// [`ELIGIBILITY_LIMIT`]; date and financial scalars take the first
    /// non-empty value; date and risk lists are deduplicated by a normalized
    /// name-plus-value key in first-seen order.
    fn merge(partials: Vec<Self>) -> Self {
        let mut merged = Self::empty();

        let mut seen_eligibility: HashSet<String> = HashSet::new();
        let mut seen_dates: HashSet<String> = HashSet::new();
        let mut seen_risks: HashSet<String> = HashSet::new();

        for partial in partials {
            keep_longest(&mut merged.project_overview, partial.project_overview.trim());

            for highlight in partial.eligibility_highlights {
                let trimmed = highlight.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if seen_eligibility.insert(normalize_key(trimmed)) {
                    merged.eligibility_highlights.push(trimmed.to_string());
                }
            }

            keep_first_non_empty(
                &mut merged.important_dates.pre_bid_queries,
                &partial.important_dates.pre_bid_queries,
            );
            keep_first_non_empty(
                &mut merged.important_dates.bid_submission,
                &partial.important_dates.bid_submission,
            );
            for entry in partial.important_dates.other_dates {
                if seen_dates.insert(composite_key(&[&entry.name, &entry.date])) {
                    merged.important_dates.other_dates.push(entry);
                }
            }

            keep_first_non_empty(
                &mut merged.financial_requirements.contract_value,
                &partial.financial_requirements.contract_value,
            );
            keep_first_non_empty(
                &mut merged.financial_requirements.document_fees,
                &partial.financial_requirements.document_fees,
            );

            keep_first_non_empty(
                &mut merged.risk_analysis.penalty_risk,
                &partial.risk_analysis.penalty_risk,
            );
            for risk in partial.risk_analysis.other_risks {
                if seen_risks.insert(composite_key(&[&risk.name, &risk.detail])) {
                    merged.risk_analysis.other_risks.push(risk);
                }
            }
        }

        merged.eligibility_highlights.truncate(ELIGIBILITY_LIMIT);
        merged
    }
}
