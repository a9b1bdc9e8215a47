use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::FaceError;

/// Separates name and role in persisted keys (`"{name}@{role}"`).
pub const KEY_SEPARATOR: char = '@';

/// Role of a registered person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Teacher => "Teacher",
        }
    }

    /// Parses the persisted spelling (`Student` / `Teacher`) only.
    /// User input goes through [`FromStr`], which ignores case.
    pub fn from_stored(s: &str) -> Option<Self> {
        [Self::Student, Self::Teacher]
            .into_iter()
            .find(|r| r.as_str() == s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FaceError;

    /// Accepts `Student` / `Teacher` in any ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("student") {
            Ok(Self::Student)
        } else if s.eq_ignore_ascii_case("teacher") {
            Ok(Self::Teacher)
        } else {
            Err(FaceError::InvalidIdentity(format!("unknown role {s:?}")))
        }
    }
}

/// A registered person. The `(name, role)` pair is the uniqueness key:
/// the same name may be registered once as a student and once as a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub role: Role,
}

impl Identity {
    /// Creates a validated identity.
    pub fn new(name: impl Into<String>, role: Role) -> Result<Self, FaceError> {
        let id = Self {
            name: name.into(),
            role,
        };
        id.validate()?;
        Ok(id)
    }

    /// Checks that the name is non-blank and free of [`KEY_SEPARATOR`].
    pub fn validate(&self) -> Result<(), FaceError> {
        if self.name.trim().is_empty() {
            return Err(FaceError::InvalidIdentity("name is empty".into()));
        }
        if self.name.contains(KEY_SEPARATOR) {
            return Err(FaceError::InvalidIdentity(format!(
                "name {:?} contains {KEY_SEPARATOR:?}",
                self.name
            )));
        }
        Ok(())
    }

    /// Returns the persisted field key, `"{name}@{role}"`.
    pub fn field_key(&self) -> String {
        format!("{}{KEY_SEPARATOR}{}", self.name, self.role)
    }

    /// Parses a persisted field key. Any failure is a [`FaceError::MalformedRecord`].
    pub fn from_field_key(key: &str) -> Result<Self, FaceError> {
        let (name, role) = key
            .split_once(KEY_SEPARATOR)
            .ok_or_else(|| FaceError::MalformedRecord(format!("key {key:?}: missing separator")))?;
        let role = Role::from_stored(role)
            .ok_or_else(|| FaceError::MalformedRecord(format!("key {key:?}: unknown role {role:?}")))?;
        Identity::new(name, role).map_err(|e| FaceError::MalformedRecord(format!("key {key:?}: {e}")))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.name, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_and_display() {
        assert_eq!("Student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert!("Janitor".parse::<Role>().is_err());
        assert_eq!(Role::Teacher.to_string(), "Teacher");
        assert_eq!(Role::from_stored("Student"), Some(Role::Student));
        assert_eq!(Role::from_stored("student"), None);
    }

    #[test]
    fn identity_validation() {
        assert!(Identity::new("Alice", Role::Student).is_ok());
        assert!(matches!(
            Identity::new("", Role::Student),
            Err(FaceError::InvalidIdentity(_))
        ));
        assert!(matches!(
            Identity::new("   ", Role::Teacher),
            Err(FaceError::InvalidIdentity(_))
        ));
        assert!(matches!(
            Identity::new("a@b", Role::Teacher),
            Err(FaceError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn field_key_format() {
        let id = Identity::new("Bob", Role::Teacher).unwrap();
        assert_eq!(id.field_key(), "Bob@Teacher");
        assert_eq!(Identity::from_field_key("Bob@Teacher").unwrap(), id);
    }

    #[test]
    fn from_field_key_malformed() {
        for key in ["Bob", "Bob@Janitor", "Bob@teacher", "Bob@TEACHER", "@Teacher", "a@b@Teacher"] {
            assert!(
                matches!(Identity::from_field_key(key), Err(FaceError::MalformedRecord(_))),
                "{key} should be malformed"
            );
        }
    }

    #[test]
    fn same_name_different_role_are_distinct() {
        let a = Identity::new("Sam", Role::Student).unwrap();
        let b = Identity::new("Sam", Role::Teacher).unwrap();
        assert_ne!(a, b);
        assert_ne!(a.field_key(), b.field_key());
    }
}
