#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Array(Vec<f64>),
}

impl Value {
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Array(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Registration request for one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    pub name: String,
    pub initial: Value,
    /// Maximum element count; the initial length for arrays, 1 for scalars.
    pub capacity: usize,
    /// Read-only for external clients. The owning service can still write.
    pub read_only: bool,
}

impl VariableSpec {
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            initial: Value::Scalar(value),
            capacity: 1,
            read_only: true,
        }
    }

    /// Zero-filled array of `capacity` elements.
    pub fn array(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            initial: Value::Array(vec![0.0; capacity]),
            capacity,
            read_only: true,
        }
    }
}
