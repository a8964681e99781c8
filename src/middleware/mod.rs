// src/middleware/mod.rs

pub mod audit;
