use crate::{Result, Value, VariableSpec};
use async_trait::async_trait;

#[async_trait]
pub trait VariableServer: Send {
    /// Expose a new variable. Names are unique per server.
    fn register(&mut self, spec: VariableSpec) -> Result<()>;

    /// Whether a variable with this full name is currently exposed.
    fn contains(&self, name: &str) -> bool;

    /// Replace the value of an exposed variable.
    async fn write(&mut self, name: &str, value: Value) -> Result<()>;
}
