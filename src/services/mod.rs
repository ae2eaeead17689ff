pub mod course_service;
pub mod validators;

pub use course_service::CourseService;
