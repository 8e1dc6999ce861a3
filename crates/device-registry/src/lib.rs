//! device-registry: screen configuration, naming and per-device profile state

mod types;
pub use types::ScreenRecord;

mod loader;
pub use loader::load_screen_records;

mod names;
pub use names::NameTranslator;

mod schema;
pub use schema::{
    build_schema, image_size, DeviceSchema, FieldDescriptor, FieldKind, SchemaError,
    DEFAULT_IMAGE_SIZE, MAX_IMAGE_SIZE,
};

mod registry;
pub use registry::{build_registry, BuildOutcome, DeviceProfile, DeviceRegistry};

mod metrics;
pub use metrics::{MetricsHub, ServiceMetrics};
