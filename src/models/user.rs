use super::role::Role;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,       // ⇔ users.username (the auditor's real name)
    pub password_hash: String,  // ⇔ users.password (argon2 PHC string)
    pub name: String,           // ⇔ users.name
    pub role: Role,             // ⇔ users.role ('specialist'|'manager'|'admin')
    pub department: String,     // ⇔ users.department
    pub phone: String,          // ⇔ users.phone (11 digits)
    pub created_at: String,     // ⇔ users.created_at (ISO8601)
}

/// Client-safe projection of a user: never includes the password hash.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub department: String,
    pub created_at: String,
}

impl User {
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            role: self.role,
            department: self.department.clone(),
            created_at: self.created_at.clone(),
        }
    }
}
