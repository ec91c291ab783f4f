//! Domain models for the window catalog.
//!
//! The seven categorical attributes each have a closed vocabulary. Values
//! arriving from outside the process (vision model output, query strings,
//! database columns) are funneled through `parse`/`try_parse` so nothing
//! outside a field's domain ever reaches storage or query building.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::DESCRIPTION_MAX_CHARS;

/// Fixed description used whenever vision analysis cannot complete.
pub const FALLBACK_DESCRIPTION: &str = "Window detected - analysis unavailable";

macro_rules! attribute_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub enum $name {
            $($variant,)+
            #[default]
            Unknown,
        }

        impl $name {
            /// Every token accepted by filters, including `unknown`.
            pub const DOMAIN: &'static [&'static str] = &[$($token,)+ "unknown"];

            /// Canonical token for this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                    Self::Unknown => "unknown",
                }
            }

            /// Strict domain match. Returns `None` for anything outside the
            /// vocabulary; callers ignore such filter values instead of erroring.
            pub fn try_parse(s: &str) -> Option<Self> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($token => Some(Self::$variant),)+
                    "unknown" => Some(Self::Unknown),
                    _ => None,
                }
            }

            /// Coercing parse: out-of-domain input becomes `Unknown`.
            pub fn parse(s: &str) -> Self {
                Self::try_parse(s).unwrap_or(Self::Unknown)
            }

            /// Storage form. `Unknown` is stored as NULL.
            pub fn as_db(&self) -> Option<&'static str> {
                match self {
                    Self::Unknown => None,
                    other => Some(other.as_str()),
                }
            }

            /// Rebuild from a nullable storage column.
            pub fn from_db(value: Option<&str>) -> Self {
                value.map(Self::parse).unwrap_or(Self::Unknown)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::parse(&s))
            }
        }
    };
}

attribute_enum! {
    /// Time of day visible in the image.
    Daytime {
        Day => "day",
        Night => "night",
    }
}

attribute_enum! {
    /// Whether the photo was taken from inside or outside.
    Location {
        Interior => "interior",
        Exterior => "exterior",
    }
}

attribute_enum! {
    /// Mechanical window type.
    WindowKind {
        Fixed => "fixed",
        Sliding => "sliding",
        Casement => "casement",
        Awning => "awning",
        Hung => "hung",
        Pivot => "pivot",
    }
}

attribute_enum! {
    /// Frame material.
    Material {
        Wood => "wood",
        Aluminum => "aluminum",
        Pvc => "pvc",
    }
}

attribute_enum! {
    /// Visible pane count.
    Panes {
        One => "1",
        Two => "2",
        Three => "3",
    }
}

attribute_enum! {
    /// Window covering.
    Covering {
        Curtains => "curtains",
        Blinds => "blinds",
        None => "none",
    }
}

attribute_enum! {
    /// Open/closed state.
    OpenState {
        Open => "open",
        Closed => "closed",
        Ajar => "ajar",
    }
}

/// The seven-field categorical summary of a window image.
///
/// The group is always present on a record; individual fields default to
/// `unknown` when the vision model omits or mangles them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowAttributes {
    #[serde(default)]
    pub daytime: Daytime,
    #[serde(default)]
    pub location: Location,
    #[serde(default, rename = "type")]
    pub kind: WindowKind,
    #[serde(default)]
    pub material: Material,
    #[serde(default)]
    pub panes: Panes,
    #[serde(default)]
    pub covering: Covering,
    #[serde(default, rename = "openState")]
    pub open_state: OpenState,
}

/// Result of vision analysis: a free-text description plus the structured
/// attribute group. Never carries out-of-domain values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub description: String,
    pub attributes: WindowAttributes,
}

impl AnalysisResult {
    /// The deterministic result used whenever analysis cannot complete.
    pub fn fallback() -> Self {
        Self {
            description: FALLBACK_DESCRIPTION.to_string(),
            attributes: WindowAttributes::default(),
        }
    }
}

/// Truncate to at most `DESCRIPTION_MAX_CHARS` characters, on a char boundary.
pub fn truncate_description(s: &str) -> String {
    if s.chars().count() <= DESCRIPTION_MAX_CHARS {
        s.to_string()
    } else {
        s.chars().take(DESCRIPTION_MAX_CHARS).collect()
    }
}

/// The canonical catalog entity. Created exactly once at ingestion and never
/// mutated thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRecord {
    /// Record identifier (UUIDv7, time-ordered).
    pub id: Uuid,
    /// SHA-256 hex digest of the original upload bytes.
    pub content_hash: String,
    /// True if another record with the same hash existed at insertion time.
    pub is_duplicate: bool,
    /// Seconds since epoch at creation.
    pub created_at: i64,
    /// Filename of the stored binary under the upload directory. Duplicates
    /// point at the original's file.
    pub image_ref: String,
    /// Free-text summary, at most 500 characters.
    pub description: String,
    /// Structured attribute group.
    #[serde(rename = "structured_data")]
    pub attributes: WindowAttributes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_round_trips_through_parse() {
        for token in WindowKind::DOMAIN {
            assert_eq!(WindowKind::parse(token).as_str(), *token);
        }
        for token in Covering::DOMAIN {
            assert_eq!(Covering::parse(token).as_str(), *token);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Daytime::parse("Day"), Daytime::Day);
        assert_eq!(Daytime::parse("NIGHT"), Daytime::Night);
        assert_eq!(Material::parse("  PVC "), Material::Pvc);
    }

    #[test]
    fn test_parse_coerces_out_of_domain_to_unknown() {
        assert_eq!(Daytime::parse("dawn"), Daytime::Unknown);
        assert_eq!(Location::parse("outside"), Location::Unknown);
        assert_eq!(Panes::parse("4"), Panes::Unknown);
        assert_eq!(OpenState::parse(""), OpenState::Unknown);
    }

    #[test]
    fn test_try_parse_rejects_out_of_domain() {
        assert_eq!(WindowKind::try_parse("louvre"), None);
        assert_eq!(WindowKind::try_parse("sliding"), Some(WindowKind::Sliding));
        assert_eq!(Covering::try_parse("unknown"), Some(Covering::Unknown));
    }

    #[test]
    fn test_panes_numeric_tokens() {
        assert_eq!(Panes::parse("2"), Panes::Two);
        assert_eq!(Panes::Two.as_str(), "2");
    }

    #[test]
    fn test_as_db_maps_unknown_to_null() {
        assert_eq!(Daytime::Unknown.as_db(), None);
        assert_eq!(Daytime::Day.as_db(), Some("day"));
        assert_eq!(Daytime::from_db(None), Daytime::Unknown);
        assert_eq!(Daytime::from_db(Some("night")), Daytime::Night);
    }

    #[test]
    fn test_from_db_coerces_corrupt_column() {
        // A column value outside the domain must not surface as-is.
        assert_eq!(Material::from_db(Some("steel")), Material::Unknown);
    }

    #[test]
    fn test_attributes_serialize_wire_names() {
        let attrs = WindowAttributes {
            kind: WindowKind::Casement,
            open_state: OpenState::Ajar,
            ..Default::default()
        };
        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json["type"], "casement");
        assert_eq!(json["openState"], "ajar");
        assert_eq!(json["daytime"], "unknown");
    }

    #[test]
    fn test_attributes_deserialize_missing_fields_default_unknown() {
        let attrs: WindowAttributes = serde_json::from_str(r#"{"daytime": "day"}"#).unwrap();
        assert_eq!(attrs.daytime, Daytime::Day);
        assert_eq!(attrs.material, Material::Unknown);
        assert_eq!(attrs.covering, Covering::Unknown);
    }

    #[test]
    fn test_attributes_deserialize_coerces_junk() {
        let attrs: WindowAttributes =
            serde_json::from_str(r#"{"daytime": "noonish", "panes": "many"}"#).unwrap();
        assert_eq!(attrs.daytime, Daytime::Unknown);
        assert_eq!(attrs.panes, Panes::Unknown);
    }

    #[test]
    fn test_fallback_result_shape() {
        let result = AnalysisResult::fallback();
        assert_eq!(result.description, FALLBACK_DESCRIPTION);
        assert_eq!(result.attributes, WindowAttributes::default());
    }

    #[test]
    fn test_truncate_description_caps_at_limit() {
        let long = "x".repeat(1000);
        assert_eq!(truncate_description(&long).chars().count(), 500);
        assert_eq!(truncate_description("short"), "short");
    }

    #[test]
    fn test_truncate_description_respects_char_boundaries() {
        let long: String = "ü".repeat(600);
        let truncated = truncate_description(&long);
        assert_eq!(truncated.chars().count(), 500);
    }

    #[test]
    fn test_window_record_wire_shape() {
        let record = WindowRecord {
            id: Uuid::nil(),
            content_hash: "ab".repeat(32),
            is_duplicate: true,
            created_at: 1_700_000_000,
            image_ref: "f.jpg".to_string(),
            description: "a window".to_string(),
            attributes: WindowAttributes::default(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["contentHash"], "ab".repeat(32));
        assert_eq!(json["isDuplicate"], true);
        assert_eq!(json["createdAt"], 1_700_000_000);
        assert!(json["structured_data"].is_object());
    }
}
