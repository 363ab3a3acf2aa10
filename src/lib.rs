pub mod command;
pub mod console;
pub mod engine;
pub mod model;
pub mod observability;
pub mod store;
