use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four membership roles. Stored as lowercase text in the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Trainer,
    Mitglied,
    Gast,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Trainer => "trainer",
            Role::Mitglied => "mitglied",
            Role::Gast => "gast",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct UnknownRole;

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "trainer" => Ok(Role::Trainer),
            "mitglied" => Ok(Role::Mitglied),
            "gast" => Ok(Role::Gast),
            _ => Err(UnknownRole),
        }
    }
}

/// Every guarded action in the system. Actions that depend on resource
/// context carry it as data, so the whole role matrix lives in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateGroup,
    UpdateGroup,
    DeleteGroup,
    ManageGroupMembers,
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    AttendEvent,
    DeclineEvent,
    SendMessage { group_member: bool },
    ManageDocuments,
    ChangeRole,
}

/// Pure role matrix, no I/O. Returns false on deny; callers translate
/// false into `AppError::Forbidden` at the boundary.
pub fn can_perform(role: Role, action: &Action) -> bool {
    match action {
        Action::CreateGroup
        | Action::UpdateGroup
        | Action::DeleteGroup
        | Action::ManageGroupMembers
        | Action::CreateEvent
        | Action::UpdateEvent
        | Action::DeleteEvent
        | Action::ManageDocuments => matches!(role, Role::Admin | Role::Trainer),
        Action::ChangeRole => role == Role::Admin,
        Action::AttendEvent | Action::DeclineEvent => true,
        Action::SendMessage { group_member } => *group_member,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Role; 4] = [Role::Admin, Role::Trainer, Role::Mitglied, Role::Gast];

    #[test]
    fn create_group_restricted_to_admin_and_trainer() {
        assert!(can_perform(Role::Admin, &Action::CreateGroup));
        assert!(can_perform(Role::Trainer, &Action::CreateGroup));
        assert!(!can_perform(Role::Mitglied, &Action::CreateGroup));
        assert!(!can_perform(Role::Gast, &Action::CreateGroup));
    }

    #[test]
    fn change_role_is_admin_only() {
        assert!(can_perform(Role::Admin, &Action::ChangeRole));
        assert!(!can_perform(Role::Trainer, &Action::ChangeRole));
        assert!(!can_perform(Role::Mitglied, &Action::ChangeRole));
        assert!(!can_perform(Role::Gast, &Action::ChangeRole));
    }

    #[test]
    fn every_role_may_respond_to_events() {
        for role in ALL_ROLES {
            assert!(can_perform(role, &Action::AttendEvent));
            assert!(can_perform(role, &Action::DeclineEvent));
        }
    }

    #[test]
    fn send_message_requires_group_membership() {
        for role in ALL_ROLES {
            assert!(can_perform(role, &Action::SendMessage { group_member: true }));
            assert!(!can_perform(role, &Action::SendMessage { group_member: false }));
        }
    }

    #[test]
    fn document_and_member_management_follow_group_rules() {
        for action in [
            Action::ManageDocuments,
            Action::ManageGroupMembers,
            Action::DeleteGroup,
            Action::CreateEvent,
            Action::DeleteEvent,
        ] {
            assert!(can_perform(Role::Admin, &action));
            assert!(can_perform(Role::Trainer, &action));
            assert!(!can_perform(Role::Mitglied, &action));
            assert!(!can_perform(Role::Gast, &action));
        }
    }

    #[test]
    fn promoted_member_gains_group_creation() {
        // mitglied denied, then after an admin promotes them to trainer
        // the same action is allowed.
        let role: Role = "mitglied".parse().unwrap();
        assert!(!can_perform(role, &Action::CreateGroup));
        let role: Role = "trainer".parse().unwrap();
        assert!(can_perform(role, &Action::CreateGroup));
    }

    #[test]
    fn role_parsing_round_trips_and_rejects_unknown() {
        for role in ALL_ROLES {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("owner".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }
}
