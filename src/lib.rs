//! Haven Core - Risk-Aware Message Processing
//!
//! This crate implements the sequential checkpoint pipeline that screens,
//! analyzes, and gates replies to messages from monitored students.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
