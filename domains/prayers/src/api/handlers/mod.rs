//! HTTP handlers for the prayers domain

pub mod feeds;
pub mod requests;
