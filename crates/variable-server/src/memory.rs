use crate::{Result, ServerError, Value, VariableServer, VariableSpec};
use async_trait::async_trait;
use std::collections::HashMap;

struct Variable {
    spec: VariableSpec,
    value: Value,
    writes: u64,
}

/// In-process variable table. Values can be read back, which makes it the
/// backend for tests and for running the service without a network server.
#[derive(Default)]
pub struct MemoryServer {
    vars: HashMap<String, Variable>,
    order: Vec<String>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name).map(|v| &v.value)
    }

    pub fn spec(&self, name: &str) -> Option<&VariableSpec> {
        self.vars.get(name).map(|v| &v.spec)
    }

    /// Number of writes since registration.
    pub fn write_count(&self, name: &str) -> u64 {
        self.vars.get(name).map(|v| v.writes).unwrap_or(0)
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[async_trait]
impl VariableServer for MemoryServer {
    fn register(&mut self, spec: VariableSpec) -> Result<()> {
        if self.vars.contains_key(&spec.name) {
            return Err(ServerError::Duplicate(spec.name));
        }
        if spec.initial.len() > spec.capacity {
            return Err(ServerError::TooLong {
                name: spec.name,
                len: spec.initial.len(),
                capacity: spec.capacity,
            });
        }
        let name = spec.name.clone();
        self.order.push(name.clone());
        self.vars.insert(
            name,
            Variable {
                value: spec.initial.clone(),
                spec,
                writes: 0,
            },
        );
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    async fn write(&mut self, name: &str, value: Value) -> Result<()> {
        let var = self
            .vars
            .get_mut(name)
            .ok_or_else(|| ServerError::NotFound(name.to_string()))?;
        if var.spec.initial.is_array() != value.is_array() {
            return Err(ServerError::TypeMismatch(name.to_string()));
        }
        if value.len() > var.spec.capacity {
            return Err(ServerError::TooLong {
                name: name.to_string(),
                len: value.len(),
                capacity: var.spec.capacity,
            });
        }
        var.value = value;
        var.writes += 1;
        tracing::trace!(name, "variable written");
        Ok(())
    }
}
