use wasm_bindgen::prelude::*;

/// Build a document description from template and record JSON, returned as JSON.
#[wasm_bindgen]
pub fn build_document(template_json: &str, record_json: &str) -> Result<String, JsValue> {
    let doc = crate::build_description_json(template_json, record_json)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&doc).map_err(|e| JsValue::from_str(&format!("Failed to serialize document: {}", e)))
}
