mod handler;
mod model;

pub use handler::{get_user, list_users, login, me, register, update_profile, update_role};
pub use model::{RegisterRequest, User};
