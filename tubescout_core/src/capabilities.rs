use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Fields a connector accepts through `auth/<provider>/set` or `tubescout config set`.
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct ConnectorConfigSchema {
    pub fields: Vec<Field>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub enum FieldType {
    Text,
    Secret, // API keys and anything else that must not be echoed
    Number,
    Boolean,
    Select { options: Vec<String> },
}

impl Field {
    pub fn new(name: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field_type,
            required: false,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

impl ConnectorConfigSchema {
    pub fn requires_auth(&self) -> bool {
        self.fields.iter().any(|f| f.required)
    }

    /// Render as a JSON Schema object suitable for an MCP tool input schema.
    pub fn to_json_schema(&self) -> Map<String, Value> {
        let mut props = Map::new();
        let mut required: Vec<String> = Vec::new();

        for f in &self.fields {
            let mut obj = Map::new();
            let ty = match &f.field_type {
                FieldType::Text => "string",
                FieldType::Secret => {
                    obj.insert("format".to_string(), json!("password"));
                    "string"
                }
                FieldType::Number => "number",
                FieldType::Boolean => "boolean",
                FieldType::Select { options } => {
                    obj.insert("enum".to_string(), json!(options));
                    "string"
                }
            };
            obj.insert("type".to_string(), json!(ty));
            if let Some(desc) = &f.description {
                obj.insert("description".to_string(), json!(desc));
            }
            props.insert(f.name.clone(), Value::Object(obj));
            if f.required {
                required.push(f.name.clone());
            }
        }

        let mut root = Map::new();
        root.insert("type".to_string(), json!("object"));
        root.insert("properties".to_string(), Value::Object(props));
        if !required.is_empty() {
            root.insert("required".to_string(), json!(required));
        }
        root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_fields_render_as_password_strings() {
        let schema = ConnectorConfigSchema {
            fields: vec![Field::new("api_key", "API Key", FieldType::Secret).required()],
        };
        let js = schema.to_json_schema();
        assert_eq!(js["properties"]["api_key"]["type"], "string");
        assert_eq!(js["properties"]["api_key"]["format"], "password");
        assert_eq!(js["required"], json!(["api_key"]));
        assert!(schema.requires_auth());
    }
}
