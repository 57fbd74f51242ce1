pub mod flow;
pub mod schedule;
pub mod world;
