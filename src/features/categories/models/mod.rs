mod category;

pub use category::{Category, CategoryFields, CategoryFilter, CategoryStatus, ParentSummary};
