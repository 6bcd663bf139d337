pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod pipeline;
pub mod shared;
pub mod template;
pub mod tui;
