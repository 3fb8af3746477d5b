use thiserror::Error;
use uuid::Uuid;

use crate::core::error::AppError;

pub type CategoryResult<T> = std::result::Result<T, CategoryError>;

/// Failures of category operations, shared by the store and the service
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Slug '{0}' already exists, please choose a different slug")]
    DuplicateSlug(String),

    #[error("{0}")]
    InvalidParent(String),

    #[error("Parent assignment would create a cycle in the category tree")]
    CyclicParent,

    #[error("Category has {0} child categories; reassign or delete them first")]
    HasChildren(i64),

    #[error("Only administrators can {0} categories")]
    Forbidden(&'static str),

    #[error("Category {0} not found")]
    NotFound(String),

    #[error("Category store unavailable: {0}")]
    Store(#[from] sqlx::Error),
}

impl CategoryError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CategoryError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(id: Uuid) -> Self {
        CategoryError::NotFound(id.to_string())
    }

    pub fn parent_not_found(parent_id: Uuid) -> Self {
        CategoryError::InvalidParent(format!("Parent category {} does not exist", parent_id))
    }
}

impl From<CategoryError> for AppError {
    fn from(e: CategoryError) -> Self {
        match e {
            CategoryError::Validation { field, message } => AppError::Validation {
                field: Some(field).filter(|f| !f.is_empty()),
                message,
            },
            CategoryError::DuplicateSlug(_) => AppError::validation("slug", e.to_string()),
            CategoryError::InvalidParent(_) | CategoryError::CyclicParent => {
                AppError::validation("parentId", e.to_string())
            }
            CategoryError::HasChildren(_) => AppError::Conflict(e.to_string()),
            CategoryError::Forbidden(_) => AppError::Forbidden(e.to_string()),
            CategoryError::NotFound(_) => AppError::NotFound(e.to_string()),
            CategoryError::Store(err) => AppError::Database(err),
        }
    }
}
