//! Category hierarchy of the wiki.
//!
//! | Method | Path                              | Access                   |
//! |--------|-----------------------------------|--------------------------|
//! | GET    | /api/categories                   | public, hidden for admin |
//! | GET    | /api/categories/tree              | public, hidden for admin |
//! | GET    | /api/categories/slug/{slug}       | public, hidden for admin |
//! | GET    | /api/categories/slug-preview      | public                   |
//! | GET    | /api/categories/{id}              | public, hidden for admin |
//! | POST   | /api/categories                   | admin                    |
//! | PUT    | /api/categories/{id}              | admin                    |
//! | DELETE | /api/categories/{id}              | admin                    |

pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use services::CategoryService;
pub use store::PgCategoryStore;
