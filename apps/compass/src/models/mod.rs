pub mod career;
pub mod dashboard;
pub mod lenient;
pub mod resume;
pub mod user;
