//! Region metadata loaded from the comma-separated region table

use std::collections::HashMap;
use std::path::Path;

use image::Rgba;
use log::{debug, warn};
use thiserror::Error;

/// Number of fields in a region record
const FIELD_COUNT: usize = 6;

/// A named, uniquely colored area of the map
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    /// Identifying color in the lookup image (alpha is always opaque)
    pub color: Rgba<u8>,
    pub owner_id: u32,
    pub owner_name: String,
}

/// What to do with records that fail validation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordPolicy {
    /// Log and drop the record, keeping everything loaded so far
    #[default]
    Skip,
    /// Fail the whole load on the first bad record
    Strict,
}

/// Errors raised while loading the region table
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read region table: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("line {line}: color {color:?} already belongs to region '{existing}'")]
    DuplicateColor {
        line: usize,
        color: [u8; 4],
        existing: String,
    },
}

/// Pack a color into a single key for table lookups
pub fn pack_color(color: Rgba<u8>) -> u32 {
    u32::from_be_bytes(color.0)
}

/// Read-only set of regions with an exact-color index
#[derive(Debug, Default)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    by_color: HashMap<u32, usize>,
}

impl RegionCatalog {
    /// Load a region table from disk
    ///
    /// Bytes that aren't valid UTF-8 are replaced rather than failing the
    /// whole table; each record is still validated under `policy`.
    pub fn load(path: impl AsRef<Path>, policy: RecordPolicy) -> Result<Self, CatalogError> {
        let bytes = std::fs::read(path.as_ref())?;
        let text = String::from_utf8_lossy(&bytes);
        let catalog = Self::parse(&text, policy)?;
        debug!(
            "Loaded {} regions from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    /// Parse region records, one per line, with no header row
    pub fn parse(text: &str, policy: RecordPolicy) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            if raw.trim().is_empty() {
                continue;
            }

            let result = parse_record(raw)
                .map_err(|reason| CatalogError::Parse { line, reason })
                .and_then(|region| catalog.insert(line, region));

            if let Err(err) = result {
                match policy {
                    RecordPolicy::Strict => return Err(err),
                    RecordPolicy::Skip => warn!("Skipping region record: {}", err),
                }
            }
        }

        Ok(catalog)
    }

    fn insert(&mut self, line: usize, region: Region) -> Result<(), CatalogError> {
        let key = pack_color(region.color);
        if let Some(&existing) = self.by_color.get(&key) {
            return Err(CatalogError::DuplicateColor {
                line,
                color: region.color.0,
                existing: self.regions[existing].name.clone(),
            });
        }

        self.by_color.insert(key, self.regions.len());
        self.regions.push(region);
        Ok(())
    }

    /// Find the region whose identifying color exactly equals `color`
    pub fn find_by_color(&self, color: Rgba<u8>) -> Option<&Region> {
        self.find_index_by_color(color).map(|i| &self.regions[i])
    }

    pub fn find_index_by_color(&self, color: Rgba<u8>) -> Option<usize> {
        self.by_color.get(&pack_color(color)).copied()
    }

    pub fn get(&self, index: usize) -> Option<&Region> {
        self.regions.get(index)
    }

    /// Regions in load order
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

fn parse_record(raw: &str) -> Result<Region, String> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            fields.len()
        ));
    }

    let channel = |i: usize, label: &str| {
        fields[i]
            .parse::<u8>()
            .map_err(|_| format!("{} channel '{}' is not in 0..=255", label, fields[i]))
    };

    let color = Rgba([channel(1, "red")?, channel(2, "green")?, channel(3, "blue")?, 255]);
    let owner_id = fields[4]
        .parse::<u32>()
        .map_err(|_| format!("owner id '{}' is not a number", fields[4]))?;

    Ok(Region {
        name: fields[0].to_string(),
        color,
        owner_id,
        owner_name: fields[5].to_string(),
    })
}
