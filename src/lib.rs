//! Order placement and inventory consistency engine.
//!
//! Store actors ([`actor_framework`]) hold products, orders and users; the
//! [`clients`] implement the [`repository`] traits on top of them; the
//! [`engine`] validates checkouts, reserves stock all-or-nothing, persists
//! orders and drives their status; [`http`] exposes it over axum.

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http;
pub mod notifications;
pub mod order_actor;
pub mod product_actor;
pub mod repository;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;
