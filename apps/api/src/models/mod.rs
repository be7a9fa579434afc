//! Row types and the TEXT-backed enums stored in them.
//!
//! Status, role and priority columns are plain TEXT; the enums below are the
//! typed view used by request bodies and business rules.

/// Declares a closed set of string values stored in a TEXT column.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} value '{other}'", stringify!($name))),
                }
            }
        }
    };
}

pub mod client;
pub mod content;
pub mod invoice;
pub mod lead;
pub mod meeting;
pub mod performance;
pub mod script;
pub mod task;
pub mod user;

text_enum!(
    /// Shared by leads and tasks.
    Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
);

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}
