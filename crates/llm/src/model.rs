pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Returns the trimmed model id, or the default model when it is blank.
pub fn resolve_model_id(model_id: &str) -> String {
    let model_id = model_id.trim();
    if model_id.is_empty() {
        DEFAULT_OPENAI_MODEL.to_string()
    } else {
        model_id.to_string()
    }
}
