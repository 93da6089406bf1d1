//! HTTP handlers for object CRUD and service status.

pub mod object;
pub mod status;
