use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access roles, broadest first. There is no per-resource ACL; routes gate on
/// role alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn new(email: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("EDITOR".parse::<Role>(), Ok(Role::Editor));
        assert_eq!("viewer".parse::<Role>(), Ok(Role::Viewer));
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("owner".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn role_round_trips_through_display() {
        for role in [Role::Admin, Role::Editor, Role::Viewer] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
    }
}
