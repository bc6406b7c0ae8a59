use thiserror::Error;

#[derive(Error, Debug)]
pub enum CostError {
    #[error("Parameter '{name}' not found in the design parameters")]
    ParameterNotFound { name: String },

    #[error("Parameter '{name}' is not numeric")]
    ParameterNotNumeric { name: String },

    #[error("Account '{account}' not found in the cost table")]
    MissingAccount { account: String },

    #[error("Invalid catalog row {row}: {reason}")]
    InvalidCatalog { row: usize, reason: String },

    #[error("Enrichment {enrichment} is too high (must be below 0.2)")]
    EnrichmentTooHigh { enrichment: f64 },

    #[error("No compressor cost correlation applies: need 'Primary Loop Count' or both 'Compressor Isentropic Efficiency' and 'Compressor Pressure Ratio'")]
    CompressorCorrelationUnavailable,

    #[error("Account '{account}' is marked nonstandard but has no cost formula")]
    UnknownNonstandardAccount { account: String },

    #[error("ITC and PTC are mutually exclusive; configure only one of 'ITC credit level' and 'PTC credit value'")]
    ConflictingTaxCredits,

    #[error("'PTC credit value' is configured without a 'PTC credit period'")]
    MissingPtcCreditPeriod,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CostResult<T> = Result<T, CostError>;
