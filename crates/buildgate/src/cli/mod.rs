//! Argument definitions and dispatch

pub mod commands;
pub mod handlers;
