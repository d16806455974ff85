//! SeaORM entities, one module per table
//!
//! Enum columns hold the SCREAMING_SNAKE text of the contract enum; list
//! columns on `stations` are JSON arrays.

pub mod announcement;
pub mod announcement_dismissal;
pub mod audio_clip;
pub mod audit_log;
pub mod bulletin;
pub mod bulletin_story;
pub mod category;
pub mod classification;
pub mod comment;
pub mod diary_assignee;
pub mod diary_entry;
pub mod episode;
pub mod password_reset_token;
pub mod session;
pub mod show;
pub mod station;
pub mod story;
pub mod story_classification;
pub mod story_tag;
pub mod tag;
pub mod task;
pub mod user;
