//! Synthetic car-insurance dataset generator.
//!
//! Four stages produce repair shops, policies, claims and repair-order
//! lines that obey the rating, reserve and cost roll-up arithmetic and
//! stay referentially intact. See `pipeline` for the execution order.

pub mod claim_generator;
pub mod config;
pub mod dataset;
pub mod error;
pub mod event;
pub mod geography;
pub mod hash;
pub mod name_generator;
pub mod pipeline;
pub mod policy_generator;
pub mod rating;
pub mod repair_order_generator;
pub mod rng;
pub mod sampling;
pub mod shop_generator;
pub mod sink;
pub mod stage;
pub mod store;
pub mod types;
