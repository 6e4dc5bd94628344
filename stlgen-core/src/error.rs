use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error("No allowed properties to generate from")]
    NoCandidates,
    #[error("No valid empire found after {attempts} attempts")]
    SearchExhausted { attempts: u32 },
    #[error("Invalid generator configuration: {0}")]
    InvalidConfig(String),
}
