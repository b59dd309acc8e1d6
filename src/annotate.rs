//! Per-poem matching.
//!
//! Classical text has no word boundaries, so a keyword "occurs" wherever it
//! is a substring of the body or the title. Every keyword is tested; there is
//! no longest-match or overlap resolution.

use crate::keywords::KeywordIndex;

/// Lines of a poem body are separated by a bare line feed.
pub const LINE_DELIMITER: char = '\n';

/// What one poem says about one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMatch {
    pub location_id: String,
    /// The keyword that matched first; later keywords never replace it.
    pub keyword: String,
    /// Distinct body lines containing any of the location's keywords.
    /// Empty when the match came from the title alone.
    pub relevant_lines: Vec<String>,
}

/// Matches for a single poem, one per location, in first-match order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub matches: Vec<LocationMatch>,
}

impl Annotation {
    pub fn location_ids(&self) -> Vec<String> {
        self.matches.iter().map(|m| m.location_id.clone()).collect()
    }
}

/// Append each line not already present, keeping first-seen order.
pub fn merge_lines<I, S>(existing: &mut Vec<String>, lines: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for line in lines {
        let line = line.as_ref();
        if !existing.iter().any(|l| l == line) {
            existing.push(line.to_string());
        }
    }
}

pub struct Annotator<'a> {
    index: &'a KeywordIndex,
}

impl<'a> Annotator<'a> {
    pub fn new(index: &'a KeywordIndex) -> Self {
        Annotator { index }
    }

    pub fn annotate(&self, title: &str, content: &str) -> Annotation {
        let lines: Vec<&str> = content.split(LINE_DELIMITER).collect();
        let mut annotation = Annotation::default();

        for kw in self.index.iter() {
            let needle = kw.text.as_str();
            if !content.contains(needle) && !title.contains(needle) {
                continue;
            }
            let hits = lines.iter().filter(|l| l.contains(needle));

            match annotation
                .matches
                .iter_mut()
                .find(|m| m.location_id == kw.location_id)
            {
                Some(existing) => merge_lines(&mut existing.relevant_lines, hits),
                None => {
                    let mut relevant_lines = Vec::new();
                    merge_lines(&mut relevant_lines, hits);
                    annotation.matches.push(LocationMatch {
                        location_id: kw.location_id.clone(),
                        keyword: needle.to_string(),
                        relevant_lines,
                    });
                }
            }
        }

        annotation
    }
}
