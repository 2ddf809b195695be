use serde::{Deserialize, Serialize};

/// Three-tier role hierarchy controlling visibility and edit rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Specialist, // records own entries only
    Manager,    // sees own department in admin views
    Admin,      // full access, manages users
}

impl Role {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Role::Specialist => "specialist",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "specialist" => Some(Role::Specialist),
            "manager" => Some(Role::Manager),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    fn level(&self) -> u8 {
        match self {
            Role::Specialist => 1,
            Role::Manager => 2,
            Role::Admin => 3,
        }
    }

    pub fn at_least(&self, other: Role) -> bool {
        self.level() >= other.level()
    }

    /// Managers and admins may open the admin views.
    pub fn can_view_admin(&self) -> bool {
        self.at_least(Role::Manager)
    }

    /// Only admins mutate users, roles and reference data.
    pub fn can_manage_users(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Managers are scoped to their own department; admins see everything.
    pub fn sees_all_departments(&self) -> bool {
        matches!(self, Role::Admin)
    }
}
