use thiserror::Error;

pub type BacklogResult<T> = Result<T, BacklogError>;

#[derive(Error, Debug)]
pub enum BacklogError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error in {input}: {message}")]
    Parse { input: String, message: String },

    #[error("Schema error in {input} ({stage}): missing required column '{column}'")]
    Schema {
        input: String,
        stage: String,
        column: String,
    },

    #[error("Type mismatch in column '{column}': {detail}")]
    TypeMismatch { column: String, detail: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BacklogError {
    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        BacklogError::Parse {
            input: input.into(),
            message: message.into(),
        }
    }

    pub fn schema(
        input: impl Into<String>,
        stage: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        BacklogError::Schema {
            input: input.into(),
            stage: stage.into(),
            column: column.into(),
        }
    }
}

impl From<std::io::Error> for BacklogError {
    fn from(e: std::io::Error) -> Self {
        BacklogError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for BacklogError {
    fn from(e: serde_yaml::Error) -> Self {
        BacklogError::Config(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for BacklogError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        BacklogError::Serialization(e.to_string())
    }
}
