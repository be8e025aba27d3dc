use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] crate::error::ExtractError),

    #[error("Analysis failed: {0}")]
    Analysis(#[from] crate::error::AnalysisError),
}
