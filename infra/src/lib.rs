pub mod documents;
pub mod ids;
pub mod persistence;
pub mod untyped_ids;
