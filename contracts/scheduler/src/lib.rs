#![no_std]

pub mod components;
pub mod config;
pub mod errors;
pub mod events;
pub mod interface;
pub mod scheduler;
pub mod types;

pub use scheduler::{SubscriptionScheduler, SubscriptionSchedulerClient};

#[cfg(test)]
mod tests;
