pub mod app;
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod configuration;
pub mod context;
pub mod rest;
pub mod storage;
pub mod tracing;
