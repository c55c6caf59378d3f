//! Keyed catalog of translated host messages.

use std::collections::HashMap;
use std::io::{self, Write};

/// Translated messages keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a message.
    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    /// Returns the message for `key`, or an empty string when the key is empty
    /// or unknown.
    #[must_use]
    pub fn retrieve(&self, key: &str) -> &str {
        if key.is_empty() {
            return "";
        }
        self.messages.get(key).map_or("", String::as_str)
    }

    /// Writes the message for `key` to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the writer.
    pub fn show<W: Write>(&self, key: &str, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.retrieve(key).as_bytes())
    }
}

impl<K, V> FromIterator<(K, V)> for MessageCatalog
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            messages: iter
                .into_iter()
                .map(|(key, message)| (key.into(), message.into()))
                .collect(),
        }
    }
}
