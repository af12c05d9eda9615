use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

uuid_id!(MessageId);
uuid_id!(CorrelationId);

string_id!(ZoneId);
string_id!(EntityId);

impl EntityId {
    /// Part before the first `.`, e.g. `person` for `person.alice`.
    pub fn domain(&self) -> &str {
        self.0.split_once('.').map(|(domain, _)| domain).unwrap_or("")
    }

    pub fn object_id(&self) -> &str {
        self.0
            .split_once('.')
            .map(|(_, object_id)| object_id)
            .unwrap_or(&self.0)
    }
}

/// Lower-case ASCII slug: runs of anything other than `[a-z0-9]` collapse to a
/// single `_`, with no leading or trailing `_`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// Hands out zone ids that are unique for the lifetime of the process.
#[derive(Debug, Default, Clone)]
pub struct IdManager {
    used: HashSet<String>,
}

impl IdManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_id(&self, id: &ZoneId) -> bool {
        self.used.contains(id.as_str())
    }

    /// Marks an existing id (e.g. from a loaded record) as taken.
    pub fn reserve(&mut self, id: &ZoneId) {
        self.used.insert(id.as_str().to_string());
    }

    pub fn generate_id(&mut self, suggestion: &str) -> ZoneId {
        let mut base = slugify(suggestion);
        if base.is_empty() {
            base = "zone".to_string();
        }

        let mut candidate = base.clone();
        let mut attempt = 1;
        while self.used.contains(&candidate) {
            attempt += 1;
            candidate = format!("{base}_{attempt}");
        }
        self.used.insert(candidate.clone());
        ZoneId::new(candidate)
    }
}
