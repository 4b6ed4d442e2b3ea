pub mod admin;
pub mod attempts;
pub mod auth;
pub mod catalog;
pub mod contact;
pub mod content;
pub mod health;
pub mod subscription;

pub use attempts::{my_result, submit_attempt};
pub use auth::{get_profile, login_user, register_user, update_profile};
pub use catalog::{list_categories, list_courses, list_levels, list_tests, list_videos};
pub use contact::submit_message;
pub use content::{
    course_detail, course_source, test_content, test_detail, video_detail, video_source,
};
pub use health::health_check;
pub use subscription::my_subscription;
