/// Role literal that grants access to the management API.
/// Any other value, or an absent role document, means an ordinary user.
pub const ADMIN_ROLE: &str = "admin";

/// Minimum subscription length an admin can grant, in calendar months
pub const MIN_SUBSCRIPTION_MONTHS: u32 = 1;

/// Maximum subscription length an admin can grant, in calendar months
pub const MAX_SUBSCRIPTION_MONTHS: u32 = 12;

/// Every question carries exactly this many answer options
pub const QUESTION_OPTION_COUNT: usize = 4;

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 8;

/// Maximum accepted contact-message body length in characters
pub const MAX_MESSAGE_LEN: usize = 2000;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for an out-of-range subscription length
pub const ERR_INVALID_MONTHS: &str = "Subscription length must be between 1 and 12 months";

/// Error message for a malformed email address
pub const ERR_INVALID_EMAIL: &str = "Invalid email address";

/// Error message for a too-short password
pub const ERR_PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";

/// Error message for an empty required field
pub const ERR_MISSING_FIELD: &str = "Required field is empty";
