use crate::model::{BlockId, CategoryId, Slot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    BlockNotFound(BlockId),
    CategoryNotFound(CategoryId),
    /// A block referenced a category that is not registered.
    UnknownCategory(CategoryId),
    InvalidSpan {
        start: Slot,
        end: Slot,
        total_slots: Slot,
    },
    InvalidName,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::BlockNotFound(id) => write!(f, "block not found: {id}"),
            EngineError::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            EngineError::UnknownCategory(id) => {
                write!(f, "block references unknown category: {id}")
            }
            EngineError::InvalidSpan {
                start,
                end,
                total_slots,
            } => write!(
                f,
                "invalid span [{start}, {end}): need start < end <= {total_slots}"
            ),
            EngineError::InvalidName => write!(f, "category name must not be blank"),
        }
    }
}

impl std::error::Error for EngineError {}
