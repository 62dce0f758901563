use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::extraction::sanitizer::salvage_parse;
use crate::application::ports::{CompletionBackend, CompletionError, CompletionOptions};

/// How much of the document head goes into the analysis context, in bytes.
const EXCERPT_LIMIT: usize = 2000;

const ANALYSIS_PROMPT: &str = r#"You are an expert tender document analyst with deep knowledge of government procurement. Analyze the tender document content below and extract ALL available information in the exact JSON format specified.

Instructions:
1. Extract only information explicitly mentioned in the document.
2. For dates, look for patterns like dd/mm/yyyy, dd-mm-yyyy, or written dates.
3. For financial amounts, look for currency symbols, Rs, INR, Crore, Lakh.
4. If information is not found, use 'Not specified in provided text'.
5. Be thorough; relevant details may be scattered across the document.

Respond with ONLY a valid JSON object in this exact format:
{
  "tender_id": "exact tender/RFP/NIT number from the document",
  "title": "complete project title",
  "due_date": "bid submission deadline with date and time",
  "issuing_authority": "full name of the issuing organization",
  "contract_value": "total estimated project cost with currency",
  "project_overview": "comprehensive description of scope, deliverables and objectives",
  "financial_requirements": {
    "contract_value": "total contract value with currency",
    "emd": "earnest money deposit amount and percentage",
    "performance_bg": "performance bank guarantee amount and percentage",
    "document_fees": "tender document purchase cost"
  },
  "eligibility_highlights": [ "experience, turnover, qualification and registration requirements" ],
  "important_dates": {
    "pre_bid_queries": "last date for pre-bid queries",
    "bid_submission": "bid submission deadline",
    "technical_bid_opening": "technical bid opening date and time",
    "financial_bid_opening": "financial bid opening date and time"
  },
  "risk_analysis": {
    "penalty_risk": "penalty or liquidated damages exposure",
    "retention": "retention money terms",
    "key_risks": [ "other notable risks" ]
  }
}"#;

/// Query-driven analysis of a stored document: the document head plus the
/// most relevant indexed chunks go to the backend, which answers in a
/// fixed JSON shape. A response that refuses to be JSON degrades to a
/// placeholder analysis carrying the raw text, never to an error.
pub struct AnalysisService<B> {
    backend: Arc<B>,
    primary_model: String,
    secondary_model: String,
}

impl<B> AnalysisService<B>
where
    B: CompletionBackend,
{
    pub fn new(backend: Arc<B>, primary_model: String, secondary_model: String) -> Self {
        Self {
            backend,
            primary_model,
            secondary_model,
        }
    }

    pub async fn analyze(
        &self,
        document_text: &str,
        relevant_chunks: &[String],
        query: &str,
    ) -> Result<TenderAnalysis, AnalysisError> {
        if !self.backend.is_configured() {
            return Err(AnalysisError::BackendNotConfigured);
        }

        let mut context = String::from("DOCUMENT SUMMARY:\n");
        context.push_str(excerpt(document_text, EXCERPT_LIMIT));
        context.push_str("\n\nRELEVANT SECTIONS:\n");
        for chunk in relevant_chunks {
            context.push_str("- ");
            context.push_str(chunk);
            context.push('\n');
        }

        let prompt =
            format!("{ANALYSIS_PROMPT}\n\nDocument content:\n{context}\n\nUser query: {query}");

        let raw = self.call_with_fallback(&prompt).await?;
        match salvage_parse::<TenderAnalysis>(&raw) {
            Some(analysis) => Ok(analysis),
            None => {
                tracing::warn!("Analysis response was not parseable JSON; returning placeholder");
                Ok(TenderAnalysis::placeholder(raw))
            }
        }
    }

    /// Primary model first, secondary on any call failure. Only both
    /// failing surfaces an error.
    async fn call_with_fallback(&self, prompt: &str) -> Result<String, AnalysisError> {
        let options = CompletionOptions::default();
        match self
            .backend
            .complete(prompt, &self.primary_model, options)
            .await
        {
            Ok(text) => Ok(text),
            Err(error) => {
                tracing::warn!(model = %self.primary_model, error = %error, "Primary analysis call failed; trying secondary model");
                self.backend
                    .complete(prompt, &self.secondary_model, options)
                    .await
                    .map_err(AnalysisError::Completion)
            }
        }
    }
}

fn excerpt(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenderAnalysis {
    #[serde(default)]
    pub tender_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub issuing_authority: String,
    #[serde(default)]
    pub contract_value: String,
    #[serde(default)]
    pub project_overview: String,
    #[serde(default)]
    pub financial_requirements: AnalysisFinancials,
    #[serde(default)]
    pub eligibility_highlights: Vec<String>,
    #[serde(default)]
    pub important_dates: AnalysisDates,
    #[serde(default)]
    pub risk_analysis: AnalysisRisks,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisFinancials {
    #[serde(default)]
    pub contract_value: String,
    #[serde(default)]
    pub emd: String,
    #[serde(default)]
    pub performance_bg: String,
    #[serde(default)]
    pub document_fees: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisDates {
    #[serde(default)]
    pub pre_bid_queries: String,
    #[serde(default)]
    pub bid_submission: String,
    #[serde(default)]
    pub technical_bid_opening: String,
    #[serde(default)]
    pub financial_bid_opening: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRisks {
    #[serde(default)]
    pub penalty_risk: String,
    #[serde(default)]
    pub retention: String,
    #[serde(default)]
    pub key_risks: Vec<String>,
}

impl TenderAnalysis {
    /// Placeholder shape for an unparseable model response. The raw text
    /// lands in `project_overview` so nothing the model said is lost.
    fn placeholder(raw: String) -> Self {
        Self {
            tender_id: "Not extracted".to_string(),
            title: "Document Analysis".to_string(),
            due_date: "Not specified".to_string(),
            issuing_authority: "Not specified".to_string(),
            contract_value: "Not specified".to_string(),
            project_overview: raw,
            financial_requirements: AnalysisFinancials {
                contract_value: "Not specified".to_string(),
                emd: "Not specified".to_string(),
                performance_bg: "Not specified".to_string(),
                document_fees: "Not specified".to_string(),
            },
            eligibility_highlights: vec!["Analysis available in project overview".to_string()],
            important_dates: AnalysisDates {
                pre_bid_queries: "Not specified".to_string(),
                bid_submission: "Not specified".to_string(),
                technical_bid_opening: "Not specified".to_string(),
                financial_bid_opening: "Not specified".to_string(),
            },
            risk_analysis: AnalysisRisks {
                penalty_risk: "Not specified".to_string(),
                retention: "Not specified".to_string(),
                key_risks: vec!["Please review document manually".to_string()],
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no completion backend is configured")]
    BackendNotConfigured,
    #[error("completion failed: {0}")]
    Completion(CompletionError),
}
