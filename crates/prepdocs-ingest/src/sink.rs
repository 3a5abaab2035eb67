//! Section sinks, where assembled sections are delivered.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::section::{sanitize_id, Section};
use prepdocs_core::{Error, Result};

/// Accepts batches of sections and removes them by source file.
pub trait SectionSink {
    /// Store a batch, replacing any stored section with the same id.
    /// Returns how many sections were accepted.
    fn upload(&mut self, batch: &[Section]) -> Result<usize>;

    /// Remove every section of `source_file`, or everything when `None`.
    /// Returns how many sections were removed.
    fn remove(&mut self, source_file: Option<&str>) -> Result<usize>;
}

/// Insert `incoming` into `stored`, replacing sections that share an id.
fn upsert<'s>(stored: &mut Vec<Section>, incoming: impl Iterator<Item = &'s Section>) {
    let mut positions: HashMap<String, usize> = stored
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id.clone(), i))
        .collect();
    for section in incoming {
        match positions.get(&section.id) {
            Some(&i) => stored[i] = section.clone(),
            None => {
                positions.insert(section.id.clone(), stored.len());
                stored.push(section.clone());
            }
        }
    }
}

/// Keeps sections in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    sections: Vec<Section>,
    batches: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of `upload` calls received.
    pub fn batches(&self) -> usize {
        self.batches
    }
}

impl SectionSink for MemorySink {
    fn upload(&mut self, batch: &[Section]) -> Result<usize> {
        self.batches += 1;
        upsert(&mut self.sections, batch.iter());
        Ok(batch.len())
    }

    fn remove(&mut self, source_file: Option<&str>) -> Result<usize> {
        let before = self.sections.len();
        match source_file {
            Some(name) => self.sections.retain(|s| s.source_file != name),
            None => self.sections.clear(),
        }
        Ok(before - self.sections.len())
    }
}

/// A local index directory: one JSON Lines file per source file.
#[derive(Debug, Clone)]
pub struct JsonDirSink {
    root: PathBuf,
}

impl JsonDirSink {
    /// Open (creating if needed) an index directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `source_file`'s sections.
    pub fn path_for(&self, source_file: &str) -> PathBuf {
        self.root.join(format!("{}.jsonl", sanitize_id(source_file)))
    }

    /// Read back every section stored for `source_file`.
    pub fn read(&self, source_file: &str) -> Result<Vec<Section>> {
        let mut sections = Self::read_file(&self.path_for(source_file))?;
        sections.retain(|s| s.source_file == source_file);
        Ok(sections)
    }

    /// Every section in `path`. Distinct source files may sanitize to the same file name.
    fn read_file(path: &Path) -> Result<Vec<Section>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        fs::read_to_string(path)?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(Error::from))
            .collect()
    }

    /// Replace the contents of `path` with `sections`; an empty list deletes the file.
    fn write_file(path: &Path, sections: &[Section]) -> Result<()> {
        if sections.is_empty() {
            if path.exists() {
                fs::remove_file(path)?;
                debug!("Removed {}", path.display());
            }
            return Ok(());
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for section in sections {
            serde_json::to_writer(&mut writer, section)?;
            writer.write_all(b"\n")?;
        }
        writer
            .flush()
            .map_err(|e| Error::Sink(format!("{}: {}", path.display(), e)))
    }

    fn index_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "jsonl") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl SectionSink for JsonDirSink {
    fn upload(&mut self, batch: &[Section]) -> Result<usize> {
        let mut by_file: BTreeMap<PathBuf, Vec<&Section>> = BTreeMap::new();
        for section in batch {
            by_file
                .entry(self.path_for(&section.source_file))
                .or_default()
                .push(section);
        }

        for (path, sections) in by_file {
            let mut stored = Self::read_file(&path)?;
            upsert(&mut stored, sections.into_iter());
            Self::write_file(&path, &stored)?;
        }
        Ok(batch.len())
    }

    fn remove(&mut self, source_file: Option<&str>) -> Result<usize> {
        let Some(name) = source_file else {
            let mut removed = 0;
            for path in self.index_files()? {
                removed += Self::read_file(&path)?.len();
                Self::write_file(&path, &[])?;
            }
            return Ok(removed);
        };

        let path = self.path_for(name);
        let mut stored = Self::read_file(&path)?;
        let before = stored.len();
        stored.retain(|s| s.source_file != name);
        let removed = before - stored.len();
        if removed > 0 {
            Self::write_file(&path, &stored)?;
        }
        Ok(removed)
    }
}

/// Pull `sections` and hand them to `sink` in batches of `batch_size`.
///
/// Returns the number of sections the sink accepted.
pub fn index_sections<I, S>(sections: I, sink: &mut S, batch_size: usize) -> Result<usize>
where
    I: IntoIterator<Item = Section>,
    S: SectionSink + ?Sized,
{
    if batch_size == 0 {
        return Err(Error::Config("batch_size must be at least 1".to_string()));
    }

    let mut accepted = 0;
    let mut batch = Vec::with_capacity(batch_size);
    for section in sections {
        batch.push(section);
        if batch.len() == batch_size {
            accepted += flush_batch(&mut batch, sink)?;
        }
    }
    if !batch.is_empty() {
        accepted += flush_batch(&mut batch, sink)?;
    }
    Ok(accepted)
}

fn flush_batch<S: SectionSink + ?Sized>(batch: &mut Vec<Section>, sink: &mut S) -> Result<usize> {
    let succeeded = sink.upload(batch)?;
    debug!("Indexed {} sections, {} succeeded", batch.len(), succeeded);
    batch.clear();
    Ok(succeeded)
}
