pub mod builder;
pub mod comment;
pub mod definition;
pub mod parser;
