//! HTTP route groups

pub mod components;
