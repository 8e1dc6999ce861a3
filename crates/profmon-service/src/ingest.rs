use device_registry::{DeviceRegistry, NameTranslator};
use tracing::debug;

/// Where the ingestion loop currently is. Only one cycle runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestState {
    Idle,
    AwaitingMetadata,
    AwaitingPayload,
    Computing,
    Publishing,
}

/// The consumed columns of one twiss-table line:
/// `index element_name _ _ _ beta_a beta_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'a> {
    pub element_name: &'a str,
    pub beta_a: f64,
    pub beta_b: f64,
}

/// Parse a line of exactly seven whitespace-separated tokens.
pub fn parse_row(line: &str) -> Option<Row<'_>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [_, element_name, _, _, _, beta_a, beta_b] = tokens.as_slice() else {
        return None;
    };
    Some(Row {
        element_name: *element_name,
        beta_a: beta_a.parse().ok()?,
        beta_b: beta_b.parse().ok()?,
    })
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RowStats {
    /// Rows that overwrote a device image.
    pub applied: usize,
    pub malformed: usize,
    /// Element not in the name map.
    pub unknown: usize,
    /// Device known but not registered (its schema was rejected).
    pub inactive: usize,
}

impl RowStats {
    pub fn skipped(&self) -> usize {
        self.malformed + self.unknown + self.inactive
    }
}

/// Update device images from data rows. Each matched device's image becomes
/// `beta_a` repeated over its full capacity; the model only streams optics
/// functions, not a 2-D beam distribution.
pub fn apply_rows<S: AsRef<str>>(
    names: &NameTranslator,
    registry: &mut DeviceRegistry,
    rows: &[S],
) -> RowStats {
    let mut stats = RowStats::default();
    for line in rows {
        let line = line.as_ref();
        let Some(row) = parse_row(line) else {
            debug!(line, "malformed row");
            stats.malformed += 1;
            continue;
        };
        let Some(device) = names.to_device(row.element_name) else {
            debug!(element = row.element_name, "no device for element");
            stats.unknown += 1;
            continue;
        };
        let Some(profile) = registry.get_mut(device) else {
            stats.inactive += 1;
            continue;
        };
        profile.fill_image(row.beta_a);
        stats.applied += 1;
    }
    stats
}
