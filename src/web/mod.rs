//! Web module - axum router and the server-rendered dashboard

mod app;
pub mod page;

pub use app::{build_router, AppState, DashboardOptions, FilterQuery, WebError};
