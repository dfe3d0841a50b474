pub mod api;
pub mod error;
pub mod extract;
pub mod rules;
pub mod scorer;
