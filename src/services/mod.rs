// src/services/mod.rs

pub mod audit;
pub mod grading;
pub mod quiz;
pub mod submission;
