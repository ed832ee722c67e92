//! Request handlers

pub mod dashboard;
pub mod entities;
pub mod export;
pub mod health;
