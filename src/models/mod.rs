// src/models/mod.rs

pub mod event;
pub mod log_entry;
pub mod question;
pub mod quiz;
pub mod submission;
pub mod user;
