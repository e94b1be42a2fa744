//! `SeaORM` entities.

pub mod predictions;
