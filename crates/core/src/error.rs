use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty canonical name, conflicting alias, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    #[error("unknown weekday: {0}")]
    UnknownWeekday(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
