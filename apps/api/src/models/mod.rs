pub mod application;
pub mod notification;
pub mod resume;
pub mod stats;
