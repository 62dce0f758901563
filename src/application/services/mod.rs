mod analysis_service;

pub use analysis_service::{
    AnalysisDates, AnalysisError, AnalysisFinancials, AnalysisRisks, AnalysisService,
    TenderAnalysis,
};
