//! The curated place catalog.
//!
//! Loaded once from `{"locations": [...]}`, validated, then frozen. Also
//! hosts the lexicon lint, which flags alias sets that would make one
//! location shadow another under plain substring matching.

use std::collections::HashMap;
use std::sync::LazyLock;

use place_types::{GazetteerDocument, Location};
use regex::Regex;
use thiserror::Error;

// ── Validation ───────────────────────────────────────────────────────────

static RE_LOCATION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

/// Characters that never occur inside a single matchable span of poem text:
/// whitespace (line breaks split lines) and CJK punctuation.
static RE_ALIAS_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s，。、；：！？「」『』（）《》【】]").unwrap());

#[derive(Debug, Error, PartialEq)]
pub enum GazetteerError {
    #[error("duplicate location id '{id}'")]
    DuplicateId { id: String },

    #[error("location id '{id}' must be a lowercase ascii identifier")]
    InvalidId { id: String },

    #[error("location '{id}' has an empty name")]
    EmptyName { id: String },

    #[error("location '{id}' has an unmatchable alias {alias:?}")]
    InvalidAlias { id: String, alias: String },

    #[error("location '{id}' coordinates ({lon}, {lat}) are out of range")]
    CoordinatesOutOfRange { id: String, lon: f64, lat: f64 },
}

fn validate_location(loc: &Location) -> Result<(), GazetteerError> {
    if !RE_LOCATION_ID.is_match(&loc.id) {
        return Err(GazetteerError::InvalidId { id: loc.id.clone() });
    }
    if loc.name.trim().is_empty() {
        return Err(GazetteerError::EmptyName { id: loc.id.clone() });
    }
    for alias in &loc.aliases {
        if alias.is_empty() || RE_ALIAS_BREAK.is_match(alias) {
            return Err(GazetteerError::InvalidAlias {
                id: loc.id.clone(),
                alias: alias.clone(),
            });
        }
    }
    let (lon, lat) = (loc.coordinates.longitude(), loc.coordinates.latitude());
    if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
        return Err(GazetteerError::CoordinatesOutOfRange {
            id: loc.id.clone(),
            lon,
            lat,
        });
    }
    Ok(())
}

// ── Catalog ──────────────────────────────────────────────────────────────

/// Immutable, validated location catalog. Iteration follows file order.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    locations: Vec<Location>,
    by_id: HashMap<String, usize>,
}

impl Gazetteer {
    pub fn from_document(doc: GazetteerDocument) -> Result<Self, GazetteerError> {
        Self::new(doc.locations)
    }

    pub fn new(locations: Vec<Location>) -> Result<Self, GazetteerError> {
        let mut by_id = HashMap::with_capacity(locations.len());
        for (i, loc) in locations.iter().enumerate() {
            validate_location(loc)?;
            if by_id.insert(loc.id.clone(), i).is_some() {
                return Err(GazetteerError::DuplicateId { id: loc.id.clone() });
            }
        }
        Ok(Gazetteer { locations, by_id })
    }

    pub fn get(&self, id: &str) -> Option<&Location> {
        self.by_id.get(id).map(|&i| &self.locations[i])
    }

    /// Resolve a canonical name or any alias to its location.
    pub fn find_by_name(&self, name: &str) -> Option<&Location> {
        self.locations
            .iter()
            .find(|loc| loc.name == name || loc.aliases.iter().any(|a| a == name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }
}

// ── Lexicon lint ─────────────────────────────────────────────────────────

/// A property of the alias set that matching does not guard against.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexiconIssue {
    /// The same string is claimed by two locations; only `second` will
    /// ever be credited for it.
    #[error("alias '{alias}' is claimed by both '{first}' and '{second}'")]
    AliasCollision {
        alias: String,
        first: String,
        second: String,
    },

    /// Every text containing `container` also triggers `alias`.
    #[error("alias '{alias}' of '{owner}' occurs inside '{container}' of '{container_owner}'")]
    AliasOverlap {
        alias: String,
        owner: String,
        container: String,
        container_owner: String,
    },

    #[error("alias '{alias}' of '{owner}' is a single character")]
    SingleCharacter { alias: String, owner: String },
}

impl LexiconIssue {
    /// Collisions and overlaps make matching wrong; single characters are
    /// merely risky.
    pub fn is_defect(&self) -> bool {
        !matches!(self, Self::SingleCharacter { .. })
    }
}

/// Check every keyword (canonical names included) against every other.
pub fn lint(gazetteer: &Gazetteer) -> Vec<LexiconIssue> {
    let keywords: Vec<(&str, &str)> = gazetteer
        .iter()
        .flat_map(|loc| loc.keywords().into_iter().map(move |k| (k, loc.id.as_str())))
        .collect();

    let mut issues = Vec::new();
    let mut first_owner: HashMap<&str, &str> = HashMap::new();

    for &(kw, owner) in &keywords {
        if kw.chars().count() == 1 {
            issues.push(LexiconIssue::SingleCharacter {
                alias: kw.to_string(),
                owner: owner.to_string(),
            });
        }
        match first_owner.get(kw) {
            Some(&first) if first != owner => issues.push(LexiconIssue::AliasCollision {
                alias: kw.to_string(),
                first: first.to_string(),
                second: owner.to_string(),
            }),
            Some(_) => {}
            None => {
                first_owner.insert(kw, owner);
            }
        }
    }

    for &(kw, owner) in &keywords {
        for &(other, other_owner) in &keywords {
            if owner != other_owner && kw != other && other.contains(kw) {
                issues.push(LexiconIssue::AliasOverlap {
                    alias: kw.to_string(),
                    owner: owner.to_string(),
                    container: other.to_string(),
                    container_owner: other_owner.to_string(),
                });
            }
        }
    }

    issues
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use place_types::{Coordinates, LocationKind};

    pub(crate) fn loc(id: &str, name: &str, aliases: &[&str]) -> Location {
        Location {
            id: id.into(),
            name: name.into(),
            kind: LocationKind::City,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            modern_name: String::new(),
            coordinates: Coordinates(110.0, 30.0),
            description: String::new(),
        }
    }

    fn shipped() -> Gazetteer {
        let json = include_str!("../data/locations_base.json");
        let doc: GazetteerDocument = serde_json::from_str(json).unwrap();
        Gazetteer::from_document(doc).unwrap()
    }

    #[test]
    fn test_rejects_duplicate_id() {
        let err = Gazetteer::new(vec![loc("changan", "长安", &[]), loc("changan", "西京", &[])])
            .unwrap_err();
        assert_eq!(err, GazetteerError::DuplicateId { id: "changan".into() });
    }

    #[test]
    fn test_rejects_bad_id_and_blank_name() {
        assert!(matches!(
            Gazetteer::new(vec![loc("Chang An", "长安", &[])]),
            Err(GazetteerError::InvalidId { .. })
        ));
        assert!(matches!(
            Gazetteer::new(vec![loc("changan", "  ", &[])]),
            Err(GazetteerError::EmptyName { .. })
        ));
    }

    #[test]
    fn test_rejects_unmatchable_alias() {
        for bad in ["", "长 安", "长安，", "长安\n"] {
            let res = Gazetteer::new(vec![loc("changan", "长安", &[bad])]);
            assert!(
                matches!(res, Err(GazetteerError::InvalidAlias { .. })),
                "alias {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_coordinates_out_of_range() {
        let mut l = loc("changan", "长安", &[]);
        l.coordinates = Coordinates(34.3, 108.9);
        assert!(matches!(
            Gazetteer::new(vec![l]),
            Err(GazetteerError::CoordinatesOutOfRange { .. })
        ));
    }

    #[test]
    fn test_lookup_by_id_and_alias() {
        let g = Gazetteer::new(vec![
            loc("changan", "长安", &["咸阳"]),
            loc("luoyang", "洛阳", &["东都"]),
        ])
        .unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.get("luoyang").map(|l| l.name.as_str()), Some("洛阳"));
        assert!(g.get("jinling").is_none());
        assert_eq!(g.find_by_name("咸阳").map(|l| l.id.as_str()), Some("changan"));
        assert_eq!(g.find_by_name("洛阳").map(|l| l.id.as_str()), Some("luoyang"));
        assert!(g.find_by_name("金陵").is_none());
    }

    #[test]
    fn test_lint_reports_collision() {
        let g = Gazetteer::new(vec![
            loc("tongguan", "潼关", &["秦关"]),
            loc("guanzhong", "关中", &["秦关"]),
        ])
        .unwrap();
        let issues = lint(&g);
        assert!(issues.contains(&LexiconIssue::AliasCollision {
            alias: "秦关".into(),
            first: "tongguan".into(),
            second: "guanzhong".into(),
        }));
        assert!(issues.iter().all(|i| i.is_defect()));
    }

    #[test]
    fn test_lint_reports_overlap() {
        let g = Gazetteer::new(vec![
            loc("taishan", "泰山", &["岱宗"]),
            loc("daimiao", "岱宗庙", &[]),
        ])
        .unwrap();
        let issues = lint(&g);
        assert_eq!(
            issues,
            vec![LexiconIssue::AliasOverlap {
                alias: "岱宗".into(),
                owner: "taishan".into(),
                container: "岱宗庙".into(),
                container_owner: "daimiao".into(),
            }]
        );
    }

    #[test]
    fn test_lint_ignores_overlap_within_one_location() {
        // 云梦 inside 云梦泽 is harmless: both credit the same place
        let g = Gazetteer::new(vec![loc("dongting", "洞庭湖", &["洞庭", "云梦泽", "云梦"])]).unwrap();
        assert!(lint(&g).is_empty());
    }

    #[test]
    fn test_lint_single_character_is_warning() {
        let g = Gazetteer::new(vec![loc("chu", "楚", &["楚天"])]).unwrap();
        let issues = lint(&g);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_defect());
    }

    #[test]
    fn test_shipped_lexicon_has_no_defects() {
        let g = shipped();
        let defects: Vec<_> = lint(&g).into_iter().filter(|i| i.is_defect()).collect();
        assert!(defects.is_empty(), "lexicon defects: {defects:?}");
    }

    #[test]
    fn test_shipped_lexicon_loads() {
        let g = shipped();
        assert_eq!(g.len(), 58);
        assert_eq!(g.get("weihe").map(|l| l.name.as_str()), Some("渭河"));
        assert_eq!(g.find_by_name("渭城").map(|l| l.id.as_str()), Some("weihe"));
    }
}
