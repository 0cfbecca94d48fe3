#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub onnx_model_path: String,
    /// One label per line, in output index order. ImageNet synset ids
    /// ("n01440764 tench, Tinca tinca") are stripped.
    pub labels_path: String,
    /// (height, width)
    pub input_shape: (u32, u32),
    pub top_k: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            onnx_model_path: "./models/mobilenetv2-7.onnx".to_string(),
            labels_path: "./models/synset.txt".to_string(),
            input_shape: (224, 224),
            top_k: 5,
        }
    }
}
