// The binary entry point is main.rs; this file re-declares the module tree so
// integration tests can drive the drill through `brick::session` / `brick::api`.
// Rendering code is only exercised through the binary.
#![allow(dead_code)]

pub mod api;
pub mod config;
pub mod event;
pub mod session;
pub mod store;
pub mod ui;

mod app;
