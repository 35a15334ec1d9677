//! # Identifiers
//!
//! Opaque identifiers carried by the page as `data-*` attributes.

use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
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
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

opaque_id!(
    /// Identifies a review (`data-review-id`)
    ReviewId
);

opaque_id!(
    /// Identifies a seller reply (`data-reply-id`)
    ReplyId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_should_display_their_raw_value() {
        assert_eq!(ReviewId::new("42").to_string(), "42");
        assert_eq!(ReplyId::from("r-7").as_str(), "r-7");
    }
}
