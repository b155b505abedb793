pub mod access_control;
pub mod core;
pub mod governance;
pub mod health;
pub mod in_flight;
pub mod license;
pub mod registry;
pub mod resource;
pub mod scheduler;
pub mod settlement;
pub mod signing;
