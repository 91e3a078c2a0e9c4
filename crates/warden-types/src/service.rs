//! Service types (the gated security-check features)

use serde::{Deserialize, Serialize};

use crate::ParseError;

/// Security-check feature a subscription or trial applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// IP geolocation lookup
    Geolocation,
    /// Link safety check
    LinkChecker,
    /// Uploaded file scan
    FileChecker,
}

impl ServiceType {
    /// Every service type, in display order
    pub const ALL: [ServiceType; 3] = [Self::Geolocation, Self::LinkChecker, Self::FileChecker];

    /// Get the persisted tag for this service type
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Geolocation => "geolocation",
            Self::LinkChecker => "link_checker",
            Self::FileChecker => "file_checker",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "geolocation" => Ok(Self::Geolocation),
            "link_checker" | "link-checker" => Ok(Self::LinkChecker),
            "file_checker" | "file-checker" => Ok(Self::FileChecker),
            _ => Err(ParseError::ServiceType(s.to_string())),
        }
    }
}
