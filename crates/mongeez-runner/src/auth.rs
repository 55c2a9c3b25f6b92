//! Credentials for the migration target.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

const REDACTED: &str = "[REDACTED]";

/// Username and password used by the runner.
///
/// The password is never rendered by `Debug` or `Serialize`.
#[derive(Clone, PartialEq, Eq)]
pub struct MongoAuth {
    username: String,
    password: String,
}

impl MongoAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Raw password, for executors that open the connection.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for MongoAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoAuth")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .finish()
    }
}

impl Serialize for MongoAuth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MongoAuth", 2)?;
        state.serialize_field("username", &self.username)?;
        state.serialize_field("password", REDACTED)?;
        state.end()
    }
}
