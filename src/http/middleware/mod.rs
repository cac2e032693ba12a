//! Built-in pipeline middleware.

pub mod body_parser;

pub use body_parser::BodyParser;
