use crate::schema::{build_schema, DeviceSchema, SchemaError};
use crate::types::ScreenRecord;
use std::collections::HashMap;
use tracing::{info, warn};

/// Current state of one registered device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    pub device_name: String,
    pub schema: DeviceSchema,
    /// Always `schema.image_size` long.
    pub image: Vec<f64>,
}

impl DeviceProfile {
    pub fn new(schema: DeviceSchema) -> Self {
        Self {
            device_name: schema.device_name.clone(),
            image: vec![0.0; schema.image_size],
            schema,
        }
    }

    /// Overwrite every element of the image with `value`.
    pub fn fill_image(&mut self, value: f64) {
        let n = self.schema.image_size;
        self.image.clear();
        self.image.resize(n, value);
    }
}

/// Profiles keyed by device name, iterated in configuration order.
#[derive(Debug, Default, Clone)]
pub struct DeviceRegistry {
    profiles: Vec<DeviceProfile>,
    index: HashMap<String, usize>,
}

impl DeviceRegistry {
    /// Insert a profile; replacing an existing device keeps its position.
    pub fn insert(&mut self, profile: DeviceProfile) -> Option<DeviceProfile> {
        match self.index.get(&profile.device_name) {
            Some(&i) => Some(std::mem::replace(&mut self.profiles[i], profile)),
            None => {
                self.index
                    .insert(profile.device_name.clone(), self.profiles.len());
                self.profiles.push(profile);
                None
            }
        }
    }

    pub fn get(&self, device: &str) -> Option<&DeviceProfile> {
        self.index.get(device).map(|&i| &self.profiles[i])
    }

    pub fn get_mut(&mut self, device: &str) -> Option<&mut DeviceProfile> {
        match self.index.get(device) {
            Some(&i) => self.profiles.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, device: &str) -> bool {
        self.index.contains_key(device)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceProfile> {
        self.profiles.iter()
    }
}

pub struct BuildOutcome {
    pub registry: DeviceRegistry,
    /// Devices left out because their schema could not be built.
    pub rejected: Vec<(String, SchemaError)>,
}

/// Build one profile per screen. A device listed more than once is built from
/// its last record but keeps its first position.
pub fn build_registry(records: &[ScreenRecord]) -> BuildOutcome {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &ScreenRecord> = HashMap::new();
    for r in records {
        if latest.insert(r.device_name.as_str(), r).is_none() {
            order.push(r.device_name.as_str());
        }
    }

    let mut registry = DeviceRegistry::default();
    let mut rejected = Vec::new();
    for device in order {
        let Some(rec) = latest.get(device) else {
            continue;
        };
        match build_schema(rec) {
            Ok(schema) => {
                info!(
                    device,
                    element = %rec.element_name,
                    scalars = schema.scalars.len(),
                    image_size = schema.image_size,
                    "device schema built"
                );
                registry.insert(DeviceProfile::new(schema));
            }
            Err(e) => {
                warn!(device, error = %e, "device schema rejected, skipping");
                rejected.push((device.to_string(), e));
            }
        }
    }
    BuildOutcome { registry, rejected }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(element: &str, device: &str, values: Vec<f64>, props: Vec<&str>) -> ScreenRecord {
        ScreenRecord {
            element_name: element.into(),
            device_name: device.into(),
            image_name: format!("{device}:IMAGE"),
            values,
            props: props.into_iter().map(String::from).collect(),
        }
    }

    fn valid_config() -> Vec<ScreenRecord> {
        vec![
            rec("OTR1", "DEV1", vec![2.0, 3.0], vec![]),
            rec("OTR2", "DEV2", vec![4.0, 4.0, 9.0], vec!["", "", "DEV:2:X:RES"]),
            rec("OTR3", "DEV3", vec![0.0, 0.0], vec![]),
        ]
    }

    #[test]
    fn test_build_keeps_config_order() {
        let out = build_registry(&valid_config());
        assert!(out.rejected.is_empty());
        let names: Vec<_> = out.registry.iter().map(|p| p.device_name.as_str()).collect();
        assert_eq!(names, vec!["DEV1", "DEV2", "DEV3"]);
        assert_eq!(out.registry.get("DEV1").unwrap().image, vec![0.0; 6]);
        assert_eq!(out.registry.get("DEV3").unwrap().image.len(), 1_048_576);
    }

    #[test]
    fn test_malformed_property_drops_exactly_one_device() {
        let valid = build_registry(&valid_config()).registry.len();
        let mut config = valid_config();
        config[1].props = vec!["".into(), "DEV:2".into()];
        let out = build_registry(&config);
        assert_eq!(out.registry.len(), valid - 1);
        assert!(!out.registry.contains("DEV2"));
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].0, "DEV2");
    }

    #[test]
    fn test_oversized_image_rejects_device() {
        let mut config = valid_config();
        config[0].values = vec![1e12, 1e12];
        let out = build_registry(&config);
        assert_eq!(out.registry.len(), 2);
        assert!(!out.registry.contains("DEV1"));
        assert!(matches!(
            out.rejected.as_slice(),
            [(dev, SchemaError::ImageTooLarge { .. })] if dev == "DEV1"
        ));
    }

    #[test]
    fn test_duplicate_device_uses_last_record_first_position() {
        let mut config = valid_config();
        config.push(rec("OTR1B", "DEV1", vec![1.0, 2.0], vec![]));
        let out = build_registry(&config);
        assert_eq!(out.registry.len(), 3);
        let first = out.registry.iter().next().unwrap();
        assert_eq!(first.device_name, "DEV1");
        assert_eq!(first.image.len(), 2);
    }

    #[test]
    fn test_fill_image() {
        let mut out = build_registry(&valid_config());
        let p = out.registry.get_mut("DEV1").unwrap();
        p.fill_image(2.5);
        assert_eq!(p.image, vec![2.5; 6]);
        assert!(out.registry.get_mut("NOPE").is_none());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut reg = build_registry(&valid_config()).registry;
        let schema = crate::build_schema(&rec("X", "DEV2", vec![1.0, 1.0], vec![])).unwrap();
        let old = reg.insert(DeviceProfile::new(schema)).unwrap();
        assert_eq!(old.image.len(), 16);
        assert_eq!(reg.get("DEV2").unwrap().image.len(), 1);
        assert_eq!(reg.iter().nth(1).unwrap().device_name, "DEV2");
    }
}
