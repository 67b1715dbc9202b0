pub mod demo;
pub mod fetch;
