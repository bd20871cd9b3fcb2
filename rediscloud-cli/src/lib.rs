//! rediscloud-cli
//!
//! Converts a Redis database sizing sheet into Terraform variables and Redis
//! Cloud API payloads, and drives the subscription/database provisioning
//! workflow against the Redis Cloud REST API.

pub mod api;
pub mod cli;
pub mod config;
pub mod payload;
pub mod sizing;
pub mod types;
pub mod workflow;
