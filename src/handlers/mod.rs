// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod event;
pub mod health;
pub mod pages;
pub mod profile;
pub mod quiz;
pub mod submission;
