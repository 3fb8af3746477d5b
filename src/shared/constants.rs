/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;
