use crate::types::ScreenRecord;
use thiserror::Error;

/// Image capacity used when the configured dimensions multiply to nothing.
pub const DEFAULT_IMAGE_SIZE: usize = 1024 * 1024;

/// Largest image accepted from configured dimensions, in elements.
pub const MAX_IMAGE_SIZE: usize = 1 << 26;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar { value: f64 },
    Array { capacity: usize },
}

/// One variable exposed for a device. `name` is the suffix appended to the
/// device name, including its leading `:`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub read_only: bool,
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Scalar { value },
            read_only: true,
        }
    }

    pub fn array(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Array { capacity },
            read_only: true,
        }
    }

    /// Full variable name under `prefix`.
    pub fn pv_name(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.name)
    }
}

/// Variables exposed for one device: its scalar properties plus one image.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSchema {
    pub device_name: String,
    pub scalars: Vec<FieldDescriptor>,
    pub image: FieldDescriptor,
    /// Element count of the image; equals the image field's capacity.
    pub image_size: usize,
}

impl DeviceSchema {
    pub fn image_pv(&self) -> String {
        self.image.pv_name(&self.device_name)
    }

    /// Scalars in property order, then the image.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.scalars.iter().chain(std::iter::once(&self.image))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("property {index} {path:?} has no fourth ':' segment")]
    MalformedProperty { index: usize, path: String },
    #[error("property {index} {path:?} has no configured value")]
    MissingValue { index: usize, path: String },
    #[error("image dimensions {x} x {y} exceed the image size limit")]
    ImageTooLarge { x: f64, y: f64 },
}

/// `values[0] * values[1]` truncated to an integer, or [`DEFAULT_IMAGE_SIZE`]
/// when that is not a positive number. Products above [`MAX_IMAGE_SIZE`],
/// infinite ones included, are rejected.
pub fn image_size(values: &[f64]) -> Result<usize, SchemaError> {
    let [x, y, ..] = values else {
        return Ok(DEFAULT_IMAGE_SIZE);
    };
    let n = (x * y).trunc();
    if n > MAX_IMAGE_SIZE as f64 {
        Err(SchemaError::ImageTooLarge { x: *x, y: *y })
    } else if n >= 1.0 {
        Ok(n as usize)
    } else {
        Ok(DEFAULT_IMAGE_SIZE)
    }
}

/// Derive the exposed variables of one screen.
pub fn build_schema(rec: &ScreenRecord) -> Result<DeviceSchema, SchemaError> {
    let image_suffix = rec.image_name.get(rec.device_name.len()..).unwrap_or("");

    let mut scalars: Vec<FieldDescriptor> = Vec::new();
    for (index, path) in rec.props.iter().enumerate() {
        if path.is_empty() {
            continue;
        }
        let segment = path
            .split(':')
            .nth(3)
            .ok_or_else(|| SchemaError::MalformedProperty {
                index,
                path: path.clone(),
            })?;
        let value = *rec
            .values
            .get(index)
            .ok_or_else(|| SchemaError::MissingValue {
                index,
                path: path.clone(),
            })?;
        let field = FieldDescriptor::scalar(format!(":{segment}"), value);
        // Repeated property names keep their first position, last value.
        match scalars.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => scalars.push(field),
        }
    }

    let size = image_size(&rec.values)?;
    Ok(DeviceSchema {
        device_name: rec.device_name.clone(),
        scalars,
        image: FieldDescriptor::array(image_suffix, size),
        image_size: size,
    })
}
