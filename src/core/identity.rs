//! Session identity: who is asking, and which branch data they may see
//!
//! The identity is produced once at session start (by the login step or the
//! CLI flags) and never changes for the lifetime of a session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Branch scope value meaning "every branch"
pub const ALL_BRANCHES: &str = "ALL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Unknown role: {0}. Valid roles: STAFF, MANAGER, ADMIN, BUSINESS_OWNER")]
    UnknownRole(String),

    #[error("Invalid credentials for '{0}'. Try: admin, manager_br1, staff_br2")]
    UnknownUser(String),

    #[error("Branch id must not be empty")]
    EmptyBranch,
}

/// Access role of the session user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Staff,
    Manager,
    Admin,
    BusinessOwner,
}

impl Role {
    /// Wire name sent to the answering service
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "STAFF",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
            Role::BusinessOwner => "BUSINESS_OWNER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Staff => "Staff",
            Role::Manager => "Manager",
            Role::Admin => "Administrator",
            Role::BusinessOwner => "Business Owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "STAFF" => Ok(Role::Staff),
            "MANAGER" => Ok(Role::Manager),
            "ADMIN" => Ok(Role::Admin),
            "BUSINESS_OWNER" | "OWNER" => Ok(Role::BusinessOwner),
            _ => Err(IdentityError::UnknownRole(s.to_string())),
        }
    }
}

/// Which branch's data the session is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BranchScope {
    All,
    Branch(String),
}

impl BranchScope {
    pub fn as_str(&self) -> &str {
        match self {
            BranchScope::All => ALL_BRANCHES,
            BranchScope::Branch(id) => id,
        }
    }

    /// Human label used in composed queries ("Branch 2", "all branches")
    pub fn label(&self) -> String {
        match self {
            BranchScope::All => "all branches".to_string(),
            BranchScope::Branch(id) => format!("Branch {}", id),
        }
    }
}

impl fmt::Display for BranchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BranchScope {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            Err(IdentityError::EmptyBranch)
        } else if s.eq_ignore_ascii_case(ALL_BRANCHES) {
            Ok(BranchScope::All)
        } else {
            Ok(BranchScope::Branch(s.to_string()))
        }
    }
}

impl Serialize for BranchScope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BranchScope {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identity context attached to every chat request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub role: Role,
    pub branch: BranchScope,
}

/// Trusted identity handed over by the login step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub name: String,
    pub role: Role,
    pub branch: BranchScope,
}

impl SessionIdentity {
    pub fn new(name: impl Into<String>, role: Role, branch: BranchScope) -> Self {
        Self {
            name: name.into(),
            role,
            branch,
        }
    }

    /// Resolve one of the demo usernames to an identity.
    ///
    /// `manager*` users are bound to branch 1 unless the name mentions `br2`;
    /// `staff*` users are bound to branch 2 unless the name mentions `br1`.
    pub fn from_username(username: &str) -> Result<Self, IdentityError> {
        let user = username.trim().to_lowercase();

        let (role, branch) = if user == "admin" {
            (Role::Admin, BranchScope::All)
        } else if user == "owner" {
            (Role::BusinessOwner, BranchScope::All)
        } else if user.starts_with("manager") {
            let id = if user.contains("br2") { "2" } else { "1" };
            (Role::Manager, BranchScope::Branch(id.to_string()))
        } else if user.starts_with("staff") {
            let id = if user.contains("br1") { "1" } else { "2" };
            (Role::Staff, BranchScope::Branch(id.to_string()))
        } else {
            return Err(IdentityError::UnknownUser(username.to_string()));
        };

        Ok(Self::new(username.trim(), role, branch))
    }

    pub fn context(&self) -> SessionContext {
        SessionContext {
            role: self.role,
            branch: self.branch.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_accepts_owner_alias() {
        assert_eq!("OWNER".parse::<Role>().unwrap(), Role::BusinessOwner);
        assert_eq!("business_owner".parse::<Role>().unwrap(), Role::BusinessOwner);
        assert_eq!(" staff ".parse::<Role>().unwrap(), Role::Staff);
        assert!(matches!(
            "auditor".parse::<Role>(),
            Err(IdentityError::UnknownRole(_))
        ));
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&Role::BusinessOwner).unwrap();
        assert_eq!(json, "\"BUSINESS_OWNER\"");
        let back: Role = serde_json::from_str("\"MANAGER\"").unwrap();
        assert_eq!(back, Role::Manager);
    }

    #[test]
    fn test_branch_scope_parsing() {
        assert_eq!("all".parse::<BranchScope>().unwrap(), BranchScope::All);
        assert_eq!(
            "2".parse::<BranchScope>().unwrap(),
            BranchScope::Branch("2".to_string())
        );
        assert_eq!("  ".parse::<BranchScope>(), Err(IdentityError::EmptyBranch));
        assert_eq!(
            serde_json::to_string(&BranchScope::All).unwrap(),
            "\"ALL\""
        );
    }

    #[test]
    fn test_demo_usernames() {
        let admin = SessionIdentity::from_username("Admin").unwrap();
        assert_eq!((admin.role, admin.branch), (Role::Admin, BranchScope::All));

        let owner = SessionIdentity::from_username("owner").unwrap();
        assert_eq!(owner.role, Role::BusinessOwner);

        let m1 = SessionIdentity::from_username("manager_br1").unwrap();
        assert_eq!(m1.branch, BranchScope::Branch("1".into()));
        let m2 = SessionIdentity::from_username("manager_br2").unwrap();
        assert_eq!(m2.branch, BranchScope::Branch("2".into()));
        let m = SessionIdentity::from_username("manager").unwrap();
        assert_eq!(m.branch, BranchScope::Branch("1".into()));

        let s = SessionIdentity::from_username("staff").unwrap();
        assert_eq!((s.role, s.branch), (Role::Staff, BranchScope::Branch("2".into())));
        let s1 = SessionIdentity::from_username("staff_br1").unwrap();
        assert_eq!(s1.branch, BranchScope::Branch("1".into()));
    }

    #[test]
    fn test_unknown_username_is_rejected() {
        let err = SessionIdentity::from_username("guest").unwrap_err();
        assert!(err.to_string().contains("manager_br1"));
    }
}
