mod handler;
mod model;

pub use handler::{
    add_member, create_group, delete_group, get_group, list_groups, remove_member, update_group,
};
pub use model::{CreateGroupRequest, Group};
