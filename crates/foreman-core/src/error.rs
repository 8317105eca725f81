use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForemanError {
    #[error("no active project: initialize one with init_project first")]
    ProjectNotInitialized,

    #[error("no project name provided")]
    MissingProjectName,

    #[error("invalid path '{0}': must stay inside the project directory")]
    PathEscapesRoot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ForemanError>;
