use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Location kind ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    City,
    Mountain,
    River,
    Lake,
    Region,
    /// 域外: foreign states and peoples (匈奴, 吐蕃, 日本, …)
    Foreign,
    /// Named buildings: 黄鹤楼, 鹳雀楼
    Landmark,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Mountain => "mountain",
            Self::River => "river",
            Self::Lake => "lake",
            Self::Region => "region",
            Self::Foreign => "foreign",
            Self::Landmark => "landmark",
        }
    }
}

// ── Coordinates ──────────────────────────────────────────────────────────

/// `[longitude, latitude]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates(pub f64, pub f64);

impl Coordinates {
    pub fn longitude(&self) -> f64 {
        self.0
    }

    pub fn latitude(&self) -> f64 {
        self.1
    }
}

// ── Gazetteer entry ──────────────────────────────────────────────────────

/// A curated place. `id` is the join key used by poems and evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    /// Literal spellings that identify this place in poem text.
    /// The canonical `name` is matched as well and need not be repeated.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub modern_name: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub description: String,
}

impl Location {
    /// The canonical name followed by every distinct alias, in catalog order.
    pub fn keywords(&self) -> Vec<&str> {
        let mut out: Vec<&str> = vec![self.name.as_str()];
        for alias in &self.aliases {
            if !out.contains(&alias.as_str()) {
                out.push(alias.as_str());
            }
        }
        out
    }
}

/// `{"locations": [...]}`, the shape of both the curated input catalog
/// and the augmented output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GazetteerDocument<L = Location> {
    pub locations: Vec<L>,
}

// ── Poem ─────────────────────────────────────────────────────────────────

/// Poem identifier as it appears in the source document (usually an integer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PoemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for PoemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A poem record. Fields this crate does not interpret are carried through
/// `extra` untouched so the rewritten document keeps its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poem {
    pub id: PoemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Derived: overwritten on every annotation run.
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Poem {
    /// Body text, preferring `contents` over `content`.
    pub fn text(&self) -> Option<&str> {
        self.contents.as_deref().or(self.content.as_deref())
    }
}

// ── Evidence ─────────────────────────────────────────────────────────────

/// One poem's support for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub poem_id: PoemId,
    pub title: String,
    pub author: String,
    pub content: String,
    /// Distinct lines carrying an alias, first-seen order.
    pub relevant_lines: Vec<String>,
    /// The alias that produced the first match.
    pub keyword: String,
}

impl EvidenceRecord {
    pub fn line_count(&self) -> usize {
        self.relevant_lines.len()
    }

    /// Matched through the title only; no body line names the place.
    pub fn is_title_only(&self) -> bool {
        self.relevant_lines.is_empty()
    }
}

/// A gazetteer entry plus every poem that references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedLocation {
    #[serde(flatten)]
    pub location: Location,
    #[serde(default)]
    pub poems: Vec<EvidenceRecord>,
}
