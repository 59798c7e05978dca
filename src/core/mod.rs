pub mod repository;
pub mod schemas;
