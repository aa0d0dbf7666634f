//! Core library for the MegaBlog terminal client.
//!
//! Holds everything that does not touch the terminal: configuration and
//! logging, the session store and route guard, form rules, the backend
//! facade, and the account and post flows built on it.

pub mod auth;
pub mod backend;
pub mod config;
pub mod content;
pub mod forms;
pub mod guard;
pub mod logging;
pub mod models;
pub mod posts;
pub mod routes;
pub mod session;
pub mod slug;
pub mod submit;
