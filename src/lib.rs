//! Quick-commerce delivery analytics: load order data, derive operational
//! features, aggregate KPIs, mine complaint phrases and serve it all as a
//! filterable dashboard.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod nlp;
pub mod report;
pub mod stats;
pub mod web;
