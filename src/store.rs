use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use place_types::{AnnotatedLocation, GazetteerDocument, Poem};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::gazetteer::Gazetteer;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("cannot parse {}", path.display()))
}

/// Pretty-printed, UTF-8, non-ASCII left unescaped.
pub fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(data)
        .with_context(|| format!("cannot serialize {}", path.display()))?;
    json.push('\n');
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    fs::write(path, &json).with_context(|| format!("cannot write {}", path.display()))?;
    info!(path = %path.display(), bytes = json.len(), "wrote");
    Ok(())
}

pub fn read_poems(path: &Path) -> Result<Vec<Poem>> {
    let poems: Vec<Poem> = read_json(path)?;
    info!(path = %path.display(), count = poems.len(), "loaded poems");
    Ok(poems)
}

pub fn read_gazetteer(path: &Path) -> Result<Gazetteer> {
    let doc: GazetteerDocument = read_json(path)?;
    let gazetteer = Gazetteer::from_document(doc)
        .with_context(|| format!("invalid gazetteer {}", path.display()))?;
    info!(path = %path.display(), count = gazetteer.len(), "loaded gazetteer");
    Ok(gazetteer)
}

pub fn read_annotated(path: &Path) -> Result<Vec<AnnotatedLocation>> {
    let doc: GazetteerDocument<AnnotatedLocation> = read_json(path)?;
    Ok(doc.locations)
}

pub fn write_annotated(path: &Path, locations: Vec<AnnotatedLocation>) -> Result<()> {
    write_json(path, &GazetteerDocument { locations })
}
