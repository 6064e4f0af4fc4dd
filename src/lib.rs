pub mod backend;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod limits;
pub mod model;
pub mod observability;
pub mod selection;
pub mod session;
