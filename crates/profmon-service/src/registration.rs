use crate::ServiceError;
use device_registry::{DeviceRegistry, FieldDescriptor, FieldKind};
use tracing::info;
use variable_server::{VariableServer, VariableSpec};

/// Translate one schema field into a registration request under `prefix`.
pub fn variable_spec(prefix: &str, field: &FieldDescriptor) -> VariableSpec {
    let name = field.pv_name(prefix);
    let spec = match field.kind {
        FieldKind::Scalar { value } => VariableSpec::scalar(name, value),
        FieldKind::Array { capacity } => VariableSpec::array(name, capacity),
    };
    VariableSpec {
        read_only: field.read_only,
        ..spec
    }
}

/// Register every field of every profile. Returns the number of variables.
pub fn register_profiles<S: VariableServer + ?Sized>(
    server: &mut S,
    registry: &DeviceRegistry,
) -> Result<usize, ServiceError> {
    let mut count = 0;
    for profile in registry.iter() {
        for field in profile.schema.fields() {
            let spec = variable_spec(&profile.device_name, field);
            let name = spec.name.clone();
            server
                .register(spec)
                .map_err(|source| ServiceError::Register { name, source })?;
            count += 1;
        }
    }
    info!(
        devices = registry.len(),
        variables = count,
        "registered profile variables"
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{screen, two_screens};
    use device_registry::build_registry;
    use variable_server::{MemoryServer, Value};

    #[test]
    fn test_register_scalars_and_images() {
        let registry = build_registry(&two_screens()).registry;
        let mut srv = MemoryServer::new();
        assert_eq!(register_profiles(&mut srv, &registry).unwrap(), 3);

        assert_eq!(srv.get("DEV1:RES"), Some(&Value::Scalar(0.5)));
        assert_eq!(srv.get("DEV1:IMAGE"), Some(&Value::Array(vec![0.0; 6])));
        assert_eq!(srv.get("DEV2:IMAGE"), Some(&Value::Array(vec![0.0; 4])));
        assert!(srv.spec("DEV1:RES").unwrap().read_only);
        assert_eq!(
            srv.names().collect::<Vec<_>>(),
            vec!["DEV1:RES", "DEV1:IMAGE", "DEV2:IMAGE"]
        );
    }

    #[test]
    fn test_name_collision_is_error() {
        // Device DEV with image DEV1:IMAGE exposes the same name as DEV1's image.
        let mut other = screen("OTR9", "DEV", vec![1.0, 1.0], vec![]);
        other.image_name = "DEV1:IMAGE".into();
        let mut records = two_screens();
        records.push(other);
        let registry = build_registry(&records).registry;
        let mut srv = MemoryServer::new();
        match register_profiles(&mut srv, &registry) {
            Err(ServiceError::Register { name, .. }) => assert_eq!(name, "DEV1:IMAGE"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
