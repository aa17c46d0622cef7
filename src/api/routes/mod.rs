//! API Routes
//!
//! Route handlers organized by functionality.

pub mod campaigns;
pub mod contacts;
pub mod dashboard;
pub mod events;
pub mod experiments;
pub mod forms;
pub mod health;
pub mod jobs;
pub mod media;
pub mod records;
pub mod segments;
pub mod themes;
