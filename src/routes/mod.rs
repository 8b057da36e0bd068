pub mod auth;
pub mod instructor;
pub mod pages;
pub mod student;
