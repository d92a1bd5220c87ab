//! Strongly Typed Identifiers
//!
//! Newtype wrappers around the opaque identifiers issued by the external
//! platforms. The platforms are the systems of record, so these carry the
//! upstream string verbatim; the newtype only prevents passing one kind of
//! identifier where another is expected.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Macro to define a strongly-typed, string-backed ID type.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from an upstream-issued string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the underlying identifier string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id! {
    /// Identifier of a staff user in the CRM platform.
    CrmUserId
}

define_id! {
    /// Provider-issued SID of a provisioned phone number.
    NumberSid
}

define_id! {
    /// Identifier of a payment plan (checkout link) in the payments platform.
    PlanId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = CrmUserId::new("usr_0123456789");
        assert_eq!(id.as_str(), "usr_0123456789");
        assert_eq!(id.to_string(), "usr_0123456789");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = NumberSid::new("PN123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"PN123\"");

        let back: NumberSid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_ids_are_distinct_types() {
        // Compile-time property: a function taking PlanId cannot receive a NumberSid.
        fn takes_plan(id: &PlanId) -> &str {
            id.as_str()
        }
        let plan = PlanId::new("plan_abc");
        assert_eq!(takes_plan(&plan), "plan_abc");
    }
}
