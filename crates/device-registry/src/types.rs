use serde::{Deserialize, Serialize};

/// One screen (profile monitor) as described by the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenRecord {
    /// Accelerator-model name, as used in streamed rows.
    pub element_name: String,
    /// Control-system name; also the prefix of every exposed variable.
    pub device_name: String,
    pub image_name: String,
    /// `values[0]`, `values[1]` are the image dimensions; `values[i]` is the
    /// configured value of `props[i]`.
    pub values: Vec<f64>,
    #[serde(default)]
    pub props: Vec<String>,
}
