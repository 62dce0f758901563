use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ExtractionValue;
use crate::domain::merge::{composite_key, keep_first_non_empty};

/// Scope-of-work breakdown of a works tender.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeOfWork {
    pub project_overview: ProjectOverview,
    pub major_work_components: Vec<WorkComponent>,
    pub technical_standards: Vec<TechnicalStandard>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectOverview {
    pub project_name: String,
    pub location: String,
    pub total_length: String,
    pub project_duration: String,
    pub contract_value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkComponent {
    pub s_no: String,
    pub work_description: String,
    pub quantity_specification: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalStandard {
    pub component: String,
    pub standard_specification: String,
    pub compliance_required: String,
}

impl ProjectOverview {
    fn is_empty(&self) -> bool {
        self.project_name.is_empty()
            && self.location.is_empty()
            && self.total_length.is_empty()
            && self.project_duration.is_empty()
            && self.contract_value.is_empty()
    }
}

impl ExtractionValue for ScopeOfWork {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.project_overview.is_empty()
            && self.major_work_components.is_empty()
            && self.technical_standards.is_empty()
    }

    /// Overview scalars take the first non-empty value; both lists are
    /// deduplicated by a normalized composite key over all their text fields,
    /// preserving first-seen order.
    fn merge(partials: Vec<Self>) -> Self {
        let mut merged = Self::empty();

        let mut seen_components: HashSet<String> = HashSet::new();
        let mut seen_standards: HashSet<String> = HashSet::new();

        for partial in partials {
            let overview = partial.project_overview;
            keep_first_non_empty(
                &mut merged.project_overview.project_name,
                &overview.project_name,
            );
            keep_first_non_empty(&mut merged.project_overview.location, &overview.location);
            keep_first_non_empty(
                &mut merged.project_overview.total_length,
                &overview.total_length,
            );
            keep_first_non_empty(
                &mut merged.project_overview.project_duration,
                &overview.project_duration,
            );
            keep_first_non_empty(
                &mut merged.project_overview.contract_value,
                &overview.contract_value,
            );

            for component in partial.major_work_components {
                let key = composite_key(&[
                    &component.s_no,
                    &component.work_description,
                    &component.quantity_specification,
                    &component.unit,
                ]);
                if seen_components.insert(key) {
                    merged.major_work_components.push(component);
                }
            }

            for standard in partial.technical_standards {
                let key = composite_key(&[
                    &standard.component,
                    &standard.standard_specification,
                    &standard.compliance_required,
                ]);
                if seen_standards.insert(key) {
                    merged.technical_standards.push(standard);
                }
            }
        }

        merged
    }
}
