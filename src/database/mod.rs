pub mod sqlite_repository;
pub mod task;
pub mod user;
