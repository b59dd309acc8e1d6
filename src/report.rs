use std::collections::BTreeMap;

use place_types::{AnnotatedLocation, LocationKind, Poem};

/// How often a location is cited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCount {
    pub id: String,
    pub name: String,
    pub poems: usize,
}

/// Summary counts over one annotation run's output documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusStats {
    pub total_poems: usize,
    pub poems_with_locations: usize,
    pub poems_missing_text: usize,
    pub locations_with_poems: usize,
    /// Matched locations per kind.
    pub by_kind: BTreeMap<LocationKind, usize>,
    /// Evidence records backed by the title alone.
    pub title_only_records: usize,
    /// Most-cited first; ties keep catalog order.
    pub top: Vec<LocationCount>,
}

impl CorpusStats {
    pub fn compute(poems: &[Poem], locations: &[AnnotatedLocation], top_n: usize) -> Self {
        let matched: Vec<&AnnotatedLocation> =
            locations.iter().filter(|l| !l.poems.is_empty()).collect();

        let mut by_kind = BTreeMap::new();
        for loc in &matched {
            *by_kind.entry(loc.location.kind).or_insert(0) += 1;
        }

        let mut top: Vec<LocationCount> = matched
            .iter()
            .map(|l| LocationCount {
                id: l.location.id.clone(),
                name: l.location.name.clone(),
                poems: l.poems.len(),
            })
            .collect();
        // stable sort: equal counts stay in catalog order
        top.sort_by(|a, b| b.poems.cmp(&a.poems));
        top.truncate(top_n);

        CorpusStats {
            total_poems: poems.len(),
            poems_with_locations: poems.iter().filter(|p| !p.locations.is_empty()).count(),
            poems_missing_text: poems.iter().filter(|p| p.text().is_none()).count(),
            locations_with_poems: matched.len(),
            by_kind,
            title_only_records: locations
                .iter()
                .flat_map(|l| &l.poems)
                .filter(|e| e.is_title_only())
                .count(),
            top,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Poems analyzed:          {}\n", self.total_poems));
        out.push_str(&format!("Poems with locations:    {}\n", self.poems_with_locations));
        if self.poems_missing_text > 0 {
            out.push_str(&format!("Poems without text:      {}\n", self.poems_missing_text));
        }
        out.push_str(&format!("Locations referenced:    {}\n", self.locations_with_poems));
        out.push_str(&format!("Title-only evidence:     {}\n", self.title_only_records));

        if !self.by_kind.is_empty() {
            let kinds: Vec<String> = self
                .by_kind
                .iter()
                .map(|(k, n)| format!("{} {n}", k.as_str()))
                .collect();
            out.push_str(&format!("By type:                 {}\n", kinds.join(", ")));
        }

        if !self.top.is_empty() {
            out.push_str("\nMost cited:\n");
            for c in &self.top {
                out.push_str(&format!("  {} ({}): {} poem(s)\n", c.name, c.id, c.poems));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::annotate_corpus;
    use crate::gazetteer::Gazetteer;
    use crate::gazetteer::tests::loc;
    use crate::keywords::KeywordIndex;

    fn fixture() -> (Vec<Poem>, Vec<AnnotatedLocation>) {
        let mut mountain = loc("taishan", "泰山", &["岱宗"]);
        mountain.kind = LocationKind::Mountain;
        let g = Gazetteer::new(vec![
            loc("changan", "长安", &[]),
            mountain,
            loc("liangzhou", "凉州", &[]),
            loc("luoyang", "洛阳", &[]),
        ])
        .unwrap();
        let mut poems: Vec<Poem> = serde_json::from_value(serde_json::json!([
            {"id": 1, "title": "望岳", "contents": "岱宗夫如何"},
            {"id": 2, "title": "凉州词", "contents": "黄河远上白云间"},
            {"id": 3, "title": "月下", "contents": "长安一片月"},
            {"id": 4, "title": "长安古意", "contents": "长安大道连狭斜"},
            {"id": 5, "title": "无题"}
        ]))
        .unwrap();
        let idx = KeywordIndex::build(&g);
        let annotated = annotate_corpus(&mut poems, &idx).into_annotated(&g);
        (poems, annotated)
    }

    #[test]
    fn test_counts() {
        let (poems, locations) = fixture();
        let stats = CorpusStats::compute(&poems, &locations, 15);
        assert_eq!(stats.total_poems, 5);
        assert_eq!(stats.poems_with_locations, 4);
        assert_eq!(stats.poems_missing_text, 1);
        assert_eq!(stats.locations_with_poems, 3);
        assert_eq!(stats.title_only_records, 1);
        assert_eq!(stats.by_kind.get(&LocationKind::City), Some(&2));
        assert_eq!(stats.by_kind.get(&LocationKind::Mountain), Some(&1));
    }

    #[test]
    fn test_top_sorted_with_stable_ties() {
        let (poems, locations) = fixture();
        let stats = CorpusStats::compute(&poems, &locations, 2);
        let ids: Vec<&str> = stats.top.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["changan", "taishan"]);
        assert_eq!(stats.top[0].poems, 2);
    }

    #[test]
    fn test_render_mentions_names() {
        let (poems, locations) = fixture();
        let text = CorpusStats::compute(&poems, &locations, 15).render();
        assert!(text.contains("Poems analyzed:          5"));
        assert!(text.contains("长安 (changan): 2 poem(s)"));
        assert!(text.contains("city 2, mountain 1"));
    }
}
