//! Web API for the synthetic shopper: profile CRUD, task dispatch, and the
//! read-only status/trace surface.

pub mod app;
pub mod config;
pub mod oracle;
pub mod routes;
