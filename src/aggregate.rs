//! Corpus-wide aggregation: location → supporting poems.
//!
//! Annotation is a pure per-poem map; the reverse index is a serial fold
//! over `merge_step`. Merging is keyed on (location, poem) so replaying a
//! poem, or folding into an index seeded from a previous run, never
//! duplicates a record or drops a line.

use std::collections::HashMap;

use place_types::{AnnotatedLocation, EvidenceRecord, Poem};
use tracing::{debug, info, warn};

use crate::annotate::{Annotation, Annotator, merge_lines};
use crate::gazetteer::Gazetteer;
use crate::keywords::KeywordIndex;

// ── Reverse index ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationIndex {
    records: HashMap<String, Vec<EvidenceRecord>>,
}

impl LocationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the `poems` lists of a previously written augmented
    /// gazetteer. Entries for ids the current catalog no longer knows are
    /// dropped.
    pub fn seeded(previous: &[AnnotatedLocation], gazetteer: &Gazetteer) -> Self {
        let mut index = Self::new();
        for loc in previous {
            if gazetteer.get(&loc.location.id).is_none() {
                warn!(location = %loc.location.id, "dropping evidence for unknown location");
                continue;
            }
            for record in &loc.poems {
                index.merge(&loc.location.id, record.clone());
            }
        }
        index
    }

    /// Add `record` under `location_id`, or fold its lines into the record
    /// already held for the same poem. The held record keeps its keyword.
    pub fn merge(&mut self, location_id: &str, record: EvidenceRecord) {
        let list = self.records.entry(location_id.to_string()).or_default();
        match list.iter_mut().find(|e| e.poem_id == record.poem_id) {
            Some(existing) => merge_lines(&mut existing.relevant_lines, &record.relevant_lines),
            None => list.push(record),
        }
    }

    /// Number of locations with at least one record.
    pub fn matched_locations(&self) -> usize {
        self.records.values().filter(|v| !v.is_empty()).count()
    }

    /// Attach records to every catalog entry; unmatched places get an empty list.
    pub fn into_annotated(mut self, gazetteer: &Gazetteer) -> Vec<AnnotatedLocation> {
        gazetteer
            .iter()
            .map(|loc| AnnotatedLocation {
                location: loc.clone(),
                poems: self.records.remove(&loc.id).unwrap_or_default(),
            })
            .collect()
    }
}

/// Reducer: fold one poem's annotation into the index.
pub fn merge_step(mut index: LocationIndex, poem: &Poem, annotation: &Annotation) -> LocationIndex {
    let content = poem.text().unwrap_or_default();
    for m in &annotation.matches {
        index.merge(
            &m.location_id,
            EvidenceRecord {
                poem_id: poem.id.clone(),
                title: poem.title.clone(),
                author: poem.author.clone(),
                content: content.to_string(),
                relevant_lines: m.relevant_lines.clone(),
                keyword: m.keyword.clone(),
            },
        );
    }
    index
}

// ── Corpus run ───────────────────────────────────────────────────────────

/// Annotate every poem, overwrite its `locations`, and build a fresh index.
pub fn annotate_corpus(poems: &mut [Poem], keywords: &KeywordIndex) -> LocationIndex {
    annotate_corpus_into(LocationIndex::new(), poems, keywords)
}

/// As [`annotate_corpus`], folding into an existing index.
pub fn annotate_corpus_into(
    seed: LocationIndex,
    poems: &mut [Poem],
    keywords: &KeywordIndex,
) -> LocationIndex {
    let annotator = Annotator::new(keywords);

    let annotations: Vec<Annotation> = poems
        .iter()
        .map(|poem| {
            let content = poem.text().unwrap_or_else(|| {
                warn!(poem_id = %poem.id, "poem has neither `contents` nor `content`; treating as empty");
                ""
            });
            let annotation = annotator.annotate(&poem.title, content);
            debug!(poem_id = %poem.id, title = %poem.title, matches = annotation.matches.len());
            annotation
        })
        .collect();

    let index = poems
        .iter()
        .zip(&annotations)
        .fold(seed, |acc, (poem, annotation)| merge_step(acc, poem, annotation));

    for (poem, annotation) in poems.iter_mut().zip(&annotations) {
        poem.locations = annotation.location_ids();
    }

    info!(
        poems = poems.len(),
        locations = index.matched_locations(),
        "corpus annotated"
    );
    index
}
