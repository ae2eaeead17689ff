pub mod course;
pub mod profile;
pub mod response;

pub use course::{Course, CourseLevel, NewCourseRequest, UpdateCourseRequest};
pub use profile::{Profile, UserRole};
pub use response::ApiResponse;
