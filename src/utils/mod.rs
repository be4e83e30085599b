// src/utils/mod.rs

pub mod html;
pub mod secret;
pub mod session;
