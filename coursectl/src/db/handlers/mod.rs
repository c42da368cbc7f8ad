//! Repositories, one per table.

pub mod courses;
pub mod repository;
pub mod users;

pub use courses::Courses;
pub use repository::Repository;
pub use users::Users;
