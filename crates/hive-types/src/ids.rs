//! Type-safe identifier wrappers around host-issued strings.
//!
//! The host names every live object with an opaque string: game objects
//! carry an id, rooms carry a name such as `W1N1`. Wrapping them keeps a
//! structure id from being passed where a room name is expected. The core
//! never holds a handle to a live object across a tick, only one of these
//! identifiers, resolved again through the host every time it is needed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from anything string-like.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`] value.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

define_id! {
    /// Host-issued identifier of a game object (structure, source, pile, site).
    ObjectId
}

define_id! {
    /// Name of a room (zone) such as `W1N1`.
    RoomName
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_string() {
        let id = ObjectId::new("5bbcab3c9099fc012e633e5b");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"5bbcab3c9099fc012e633e5b\""));
    }

    #[test]
    fn display_matches_inner() {
        let room = RoomName::from("W1N1");
        assert_eq!(room.to_string(), "W1N1");
        assert_eq!(room.as_str(), "W1N1");
    }
}
