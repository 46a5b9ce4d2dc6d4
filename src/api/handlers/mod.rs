pub mod auth;
pub mod movies;
pub mod pages;
pub mod users;
