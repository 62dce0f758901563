use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::ExtractionValue;
use crate::domain::merge::{body_key, normalize_key};

/// One analyzed document section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionAnalysis {
    pub section_name: String,
    pub section_summary: String,
    pub key_considerations: Vec<KeyConsideration>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConsideration {
    pub text: String,
    pub critical: bool,
    /// Free-text page reference, e.g. "3" or "pages 3-5".
    pub page: String,
}

/// Full section-wise analysis of a document. Transparent so the payload
/// stays a bare JSON array of sections.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionReport(pub Vec<SectionAnalysis>);

impl SectionReport {
    pub fn sections(&self) -> &[SectionAnalysis] {
        &self.0
    }
}

impl ExtractionValue for SectionReport {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Groups sections by normalized name (falling back to the normalized
    /// head of the summary), keeps the longest summary per group, and unions
    /// considerations deduplicated by normalized text. Groups and
    /// considerations keep first-seen order; sections with no usable key at
    /// all are dropped.
    fn merge(partials: Vec<Self>) -> Self {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, (SectionAnalysis, HashSet<String>)> = HashMap::new();

        for report in partials {
            for section in report.0 {
                let mut key = normalize_key(&section.section_name);
                if key.is_empty() {
                    key = body_key(&section.section_summary);
                }
                if key.is_empty() {
                    continue;
                }

                let (merged, seen) = groups.entry(key.clone()).or_insert_with(|| {
                    order.push(key.clone());
                    let shell = SectionAnalysis {
                        section_name: section.section_name.clone(),
                        section_summary: String::new(),
                        key_considerations: Vec::new(),
                    };
                    (shell, HashSet::new())
                });

                if section.section_summary.len() > merged.section_summary.len() {
                    merged.section_summary = section.section_summary;
                }
                for consideration in section.key_considerations {
                    if seen.insert(normalize_key(&consideration.text)) {
                        merged.key_considerations.push(consideration);
                    }
                }
            }
        }

        let sections = order
            .into_iter()
            .filter_map(|key| groups.remove(&key).map(|(section, _)| section))
            .collect();
        Self(sections)
    }
}
