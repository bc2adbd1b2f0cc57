pub mod executor;
pub mod resolver;
pub mod results;
pub mod runner;
