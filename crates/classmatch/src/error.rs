#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("no schedule data found")]
    NoScheduleData,

    #[error("unreadable document: {0}")]
    Document(String),

    #[error("page {page}: {stage} timed out after {seconds}s")]
    Timeout {
        stage: String,
        page: usize,
        seconds: u64,
    },

    #[error("page {page}: {stage} failed: {message}")]
    Extraction {
        stage: String,
        page: usize,
        message: String,
    },

    #[error("authoritative schedule is missing a `{0}` column")]
    MissingColumn(String),

    #[error("authoritative schedule row {row}: {message}")]
    AuthoritativeRow { row: usize, message: String },

    #[error("authoritative schedule: {0}")]
    Authoritative(String),
}
