use thiserror::Error;

/// The only fatal conditions in the extraction core. Everything else is
/// absorbed into quality scores and sentinel fields.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page fetch collaborator failed outright (upstream unreachable).
    #[error("page fetch failed for {subject} {term}: {cause}")]
    Fetch {
        term: String,
        subject: String,
        cause: anyhow::Error,
    },

    /// The collaborator answered, but with nothing to extract from. The core
    /// does not fabricate data.
    #[error("no raw text returned for {subject} {term}")]
    NoRawInput { term: String, subject: String },
}
