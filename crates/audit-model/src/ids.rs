//! Strongly-typed identifiers
//!
//! Backend ids are plain integers; wrapping them keeps person, role,
//! revision and custom-attribute ids from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create from raw backend id
            #[inline]
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw backend id
            #[inline]
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            #[inline]
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

backend_id!(
    /// Person id
    PersonId
);

backend_id!(
    /// Access-control role id
    RoleId
);

backend_id!(
    /// Revision row id
    RevisionId
);

backend_id!(
    /// Custom attribute definition id
    CustomAttributeId
);
