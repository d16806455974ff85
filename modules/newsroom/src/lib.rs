//! Newsroom Module
//!
//! Editorial workflow for a news agency: stories move from draft through
//! review to publication, and radio stations receive the published content
//! filtered by their language, religion, locality and category rules.

// Public exports
pub mod contract;
pub use contract::{NewsroomError, Principal, StaffRole, UserType};

pub mod module;
pub use module::NewsroomModule;

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
