//! nodeman - manage the hosts registered with a cluster node API

pub mod api;
pub mod display;
pub mod formatting;
pub mod models;
pub mod tui;
