pub mod category;
pub mod content;
pub mod level;
pub mod message;
pub mod subscription;
pub mod test_result;
pub mod user;

pub use category::{Category, CategoryKind, CategoryRecord};
pub use content::{CourseRecord, PrivateSource, Question, TestContent, TestRecord, VideoRecord};
pub use level::{Level, LevelRecord};
pub use message::{Message, MessageRecord};
pub use subscription::{expiry_after_months, SubscriptionRecord};
pub use test_result::{grade, GradeSummary, TestResultRecord};
pub use user::{normalize_email, validate_email, Profile, RoleRecord, UserRecord};
