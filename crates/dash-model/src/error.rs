use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown field kind: {0}")]
    UnknownFieldKind(String),
    #[error("unknown measure operation: {0}")]
    UnknownMeasureOp(String),
    #[error("unknown widget kind: {0}")]
    UnknownWidgetKind(String),
    #[error("unknown selection state: {0}")]
    UnknownValueState(String),
    #[error("invalid selection '{0}': expected FIELD=VALUE")]
    InvalidSelection(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
