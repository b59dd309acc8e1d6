use std::collections::HashMap;

use tracing::warn;

use crate::gazetteer::{Gazetteer, LexiconIssue};

/// One matchable string and the location it credits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub text: String,
    pub location_id: String,
}

/// Every keyword across the gazetteer, in catalog order (each location's
/// canonical name, then its aliases).
///
/// A keyword claimed by two locations keeps its first position but is
/// re-assigned to the later owner; the collision is recorded and logged.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    entries: Vec<Keyword>,
    positions: HashMap<String, usize>,
    collisions: Vec<LexiconIssue>,
}

impl KeywordIndex {
    pub fn build(gazetteer: &Gazetteer) -> Self {
        let mut index = KeywordIndex::default();
        for loc in gazetteer.iter() {
            for kw in loc.keywords() {
                index.insert(kw, &loc.id);
            }
        }
        index
    }

    fn insert(&mut self, text: &str, location_id: &str) {
        if text.is_empty() {
            return;
        }
        match self.positions.get(text) {
            Some(&pos) => {
                let entry = &mut self.entries[pos];
                if entry.location_id != location_id {
                    warn!(
                        keyword = text,
                        previous = %entry.location_id,
                        current = location_id,
                        "keyword collision; later location wins"
                    );
                    self.collisions.push(LexiconIssue::AliasCollision {
                        alias: text.to_string(),
                        first: entry.location_id.clone(),
                        second: location_id.to_string(),
                    });
                    entry.location_id = location_id.to_string();
                }
            }
            None => {
                self.positions.insert(text.to_string(), self.entries.len());
                self.entries.push(Keyword {
                    text: text.to_string(),
                    location_id: location_id.to_string(),
                });
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Keyword> {
        self.entries.iter()
    }

    pub fn collisions(&self) -> &[LexiconIssue] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
