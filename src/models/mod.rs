// src/models/mod.rs

pub mod admin;
pub mod captcha;
pub mod meta;
pub mod result;
