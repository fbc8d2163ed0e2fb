pub mod dashboard;
pub mod document;
pub mod event;
pub mod group;
pub mod message;
pub mod notification;
pub mod user;
