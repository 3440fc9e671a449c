//! Storage backends for the provider traits.

pub mod postgres;

pub use postgres::{PostgresDirectory, PostgresRecruitStore, PostgresSequenceGenerator};
