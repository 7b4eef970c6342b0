//! Newtype wrappers around `i64` row identifiers.
//!
//! Using distinct types prevents accidentally passing a `HookId` where a
//! `ModuleId` is expected. Identifiers are system-assigned and strictly
//! increasing within a store, so ordering by id is ordering by creation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Macro to define a newtype ID wrapper around `i64`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Create an identifier from a raw value.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw value.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a registered module.
    ModuleId
);

define_id!(
    /// Identifier of a hook definition in the catalog.
    HookId
);

define_id!(
    /// Identifier of a module-to-hook binding.
    BindingId
);

define_id!(
    /// Identifier of an investigation case.
    CaseId
);
