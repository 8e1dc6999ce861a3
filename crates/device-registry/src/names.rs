use crate::types::ScreenRecord;
use std::collections::HashMap;
use tracing::warn;

/// Bidirectional element-name / device-name lookup.
///
/// Later records win on conflicts; the stale reverse entry is dropped so the
/// two maps always stay inverse to each other.
#[derive(Debug, Default, Clone)]
pub struct NameTranslator {
    ele2dev: HashMap<String, String>,
    dev2ele: HashMap<String, String>,
}

impl NameTranslator {
    pub fn from_records(records: &[ScreenRecord]) -> Self {
        let mut names = Self::default();
        for r in records {
            names.insert(&r.element_name, &r.device_name);
        }
        names
    }

    /// Map `element` to `device` and back. When either name was already mapped
    /// elsewhere, the displaced partner loses its entry: after `OTR1 -> DEV1`
    /// then `OTR2 -> DEV1`, `OTR1` no longer resolves, so rows for it are
    /// counted unknown instead of landing on `DEV1`.
    pub fn insert(&mut self, element: &str, device: &str) {
        if let Some(old_dev) = self.ele2dev.insert(element.to_string(), device.to_string()) {
            if old_dev != device {
                warn!(element, old = %old_dev, new = device, "element remapped");
                if self.dev2ele.get(&old_dev).map(String::as_str) == Some(element) {
                    self.dev2ele.remove(&old_dev);
                }
            }
        }
        if let Some(old_ele) = self.dev2ele.insert(device.to_string(), element.to_string()) {
            if old_ele != element {
                warn!(device, old = %old_ele, new = element, "device remapped");
                if self.ele2dev.get(&old_ele).map(String::as_str) == Some(device) {
                    self.ele2dev.remove(&old_ele);
                }
            }
        }
    }

    pub fn to_device(&self, element: &str) -> Option<&str> {
        self.ele2dev.get(element).map(String::as_str)
    }

    pub fn to_element(&self, device: &str) -> Option<&str> {
        self.dev2ele.get(device).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ele2dev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ele2dev.is_empty()
    }
}
