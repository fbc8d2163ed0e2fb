mod handler;
mod model;

pub use handler::{
    attend_event, create_event, decline_event, delete_event, get_event, list_events,
    update_event, upcoming_events,
};
pub use model::{CreateEventRequest, Event};
