use redb::TableDefinition;

/// Users table: uid -> UserRecord (serialized profile + credentials)
pub const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Email index: normalized email -> uid (login lookup, uniqueness)
pub const EMAIL_INDEX: TableDefinition<&str, &str> = TableDefinition::new("email_index");

/// Roles table: uid -> RoleRecord
/// Absence of a row means "not admin". Rows are written out-of-band.
pub const ROLES: TableDefinition<&str, &[u8]> = TableDefinition::new("roles");

/// Educational levels: level id -> LevelRecord
pub const LEVELS: TableDefinition<&str, &[u8]> = TableDefinition::new("educational_levels");

/// Categories: category id -> CategoryRecord (kind stored explicitly)
pub const CATEGORIES: TableDefinition<&str, &[u8]> = TableDefinition::new("categories");

/// Videos: video id -> VideoRecord (public metadata only)
pub const VIDEOS: TableDefinition<&str, &[u8]> = TableDefinition::new("videos");

/// Private video sources: video id -> PrivateSource
/// Gated sibling of VIDEOS; read only after the entitlement check passes.
pub const VIDEO_SOURCES: TableDefinition<&str, &[u8]> = TableDefinition::new("video_sources");

/// Courses: course id -> CourseRecord (public metadata only)
pub const COURSES: TableDefinition<&str, &[u8]> = TableDefinition::new("courses");

/// Private course sources: course id -> PrivateSource
pub const COURSE_SOURCES: TableDefinition<&str, &[u8]> = TableDefinition::new("course_sources");

/// Tests: test id -> TestRecord (public metadata only)
pub const TESTS: TableDefinition<&str, &[u8]> = TableDefinition::new("tests");

/// Private test content: test id -> TestContent (the question set)
pub const TEST_CONTENT: TableDefinition<&str, &[u8]> = TableDefinition::new("test_content");

/// Subscriptions: uid -> SubscriptionRecord
/// Keyed by uid, so a user holds at most one subscription document.
pub const SUBSCRIPTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("subscriptions");

/// Contact messages: message id -> MessageRecord
pub const MESSAGES: TableDefinition<&str, &[u8]> = TableDefinition::new("messages");

/// Test results: result id -> TestResultRecord
pub const TEST_RESULTS: TableDefinition<&str, &[u8]> = TableDefinition::new("test_results");

/// Result index: "test_id/uid" -> result id
/// Enforces at most one recorded attempt per user per test.
pub const RESULT_INDEX: TableDefinition<&str, &str> = TableDefinition::new("result_index");
