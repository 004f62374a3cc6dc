//! Data models for the back-office application.
//!
//! These models match the admin front-end interfaces exactly for seamless interoperability.

mod code;
mod menu;
mod menu_authority;

pub use code::*;
pub use menu::*;
pub use menu_authority::*;
