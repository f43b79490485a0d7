//! Request middleware.

pub mod access_control;
