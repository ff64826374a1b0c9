use serde::{Deserialize, Serialize};

/// Raised when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: {value:?}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(ConsentStatus {
    Pending => "pending",
    Active => "active",
});

str_enum!(ConsentPurpose {
    ResearchStudy => "Research Study Participation",
    ResearchDataSharing => "Data Sharing with Research Institution",
    ThirdPartyAnalytics => "Third-Party Analytics Access",
    InsuranceProvider => "Insurance Provider Access",
});

str_enum!(StatusFilter {
    All => "all",
    Active => "active",
    Pending => "pending",
});

impl StatusFilter {
    /// Status sent to the backend; `All` applies no server-side filter.
    pub fn as_query(&self) -> Option<ConsentStatus> {
        match self {
            Self::All => None,
            Self::Active => Some(ConsentStatus::Active),
            Self::Pending => Some(ConsentStatus::Pending),
        }
    }

    /// Capitalized label for filter buttons.
    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Pending => "Pending",
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::All
    }
}
