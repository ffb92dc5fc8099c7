pub mod cli;
pub mod market;
pub mod model;
pub mod run;
pub mod schema;
pub mod sim;
pub mod strategy;
pub mod venues;
