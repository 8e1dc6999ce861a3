//! variable-server: the registration and write surface the profile service
//! publishes through

mod types;
pub use types::{Value, VariableSpec};

mod error;
pub use error::{Result, ServerError};

mod traits;
pub use traits::VariableServer;

mod memory;
pub use memory::MemoryServer;
