mod handler;
mod model;

pub use handler::{list_messages, send_message};
