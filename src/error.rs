use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed reference data or input schema. Fatal for the
    /// evaluation sheets; recoverable for the lecturer directory, where the
    /// pipeline degrades to treating every name as unresolved.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A group or row that cannot be numerically aggregated. Collected per
    /// offending group so the rest of the run still produces output.
    #[error("Data quality error: {0}")]
    DataQuality(String),

    /// A report document that cannot be produced. Fatal only for that one
    /// document; the batch continues.
    #[error("Render error: {0}")]
    Render(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
