/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum number of features returned by the map endpoint
pub const MAP_MAX_FEATURES: usize = 1000;

/// Maximum number of near-duplicate reports shown to a submitter
pub const MAX_DUPLICATE_SUGGESTIONS: usize = 5;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Official role - can review reports and change their status
pub const ROLE_OFFICIAL: &str = "official";
