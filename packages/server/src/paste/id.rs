use std::fmt;

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;

/// Length of every generated paste identifier.
pub const PASTE_ID_LEN: usize = 16;

/// Public identifier of a paste: 16 characters from `[A-Za-z0-9]`.
///
/// Drawn from the thread-local CSPRNG. Uniqueness is not checked against
/// existing rows; at 62^16 the collision odds are negligible.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PasteId(String);

impl PasteId {
    pub fn generate() -> Self {
        let id = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(PASTE_ID_LEN)
            .map(char::from)
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PasteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
