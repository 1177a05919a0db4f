pub mod config;
pub mod controller;
pub mod export;
pub mod page;
pub mod state;
pub mod terminal;

#[cfg(target_arch = "wasm32")]
pub mod web;
