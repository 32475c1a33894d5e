//! ResultExecute - Aggregate outcome of one manager operation
//!
//! Holds the affected entities and the recoverable errors. Success is
//! decided by the error list alone.

use serde::Serialize;

use super::entity::{Entity, Value};
use super::error::ErrorRecord;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultExecute {
    resources: Vec<Entity>,
    errors: Vec<ErrorRecord>,
}

impl ResultExecute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: ErrorRecord) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn add_errors(&mut self, errors: impl IntoIterator<Item = ErrorRecord>) -> &mut Self {
        self.errors.extend(errors);
        self
    }

    pub fn add_resource(&mut self, entity: Entity) -> &mut Self {
        self.resources.push(entity);
        self
    }

    pub fn resources(&self) -> &[Entity] {
        &self.resources
    }

    /// First affected entity
    pub fn resource(&self) -> Option<&Entity> {
        self.resources.first()
    }

    pub fn into_resource(self) -> Option<Entity> {
        self.resources.into_iter().next()
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn error(&self, index: usize) -> Option<&ErrorRecord> {
        self.errors.get(index)
    }

    pub fn first_error(&self) -> Option<&ErrorRecord> {
        self.errors.first()
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn ok(&self) -> bool {
        self.success()
    }

    /// Error codes in order
    pub fn codes(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.code()).collect()
    }

    /// Short view: `{code, label, message, value}` per error
    pub fn simple_errors(&self) -> Vec<Value> {
        self.errors.iter().map(ErrorRecord::to_json).collect()
    }

    /// Append another result's errors and resources after ours
    pub fn merge(&mut self, other: ResultExecute) -> &mut Self {
        self.errors.extend(other.errors);
        self.resources.extend(other.resources);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::error::ErrorKind;
    use serde_json::json;

    fn error(code: &str) -> ErrorRecord {
        ErrorRecord::new(ErrorKind::NotValid, code, "field", "bad", Value::Null)
    }

    #[test]
    fn test_success_ignores_resources() {
        let mut result = ResultExecute::new();
        assert!(result.success());
        assert!(result.resource().is_none());

        result.add_error(error("A"));
        result.add_resource(Entity::new("user"));
        assert!(!result.success());
        assert!(!result.ok());
        assert_eq!(result.resources().len(), 1);
    }

    #[test]
    fn test_error_accessors() {
        let mut result = ResultExecute::new();
        result.add_errors(vec![error("A"), error("B")]);

        assert_eq!(result.codes(), vec!["A", "B"]);
        assert_eq!(result.first_error().map(|e| e.code()), Some("A"));
        assert_eq!(result.error(1).map(|e| e.code()), Some("B"));
        assert!(result.error(2).is_none());
    }

    #[test]
    fn test_simple_errors_shape() {
        let mut result = ResultExecute::new();
        result.add_error(ErrorRecord::new(
            ErrorKind::NotDefined,
            "USER_EMAIL_NOT_DEFINED",
            "email",
            "The email is required",
            Value::Null,
        ));

        assert_eq!(
            result.simple_errors(),
            vec![json!({
                "code": "USER_EMAIL_NOT_DEFINED",
                "label": "email",
                "message": "The email is required",
                "value": null,
            })]
        );
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut first = ResultExecute::new();
        first.add_error(error("AUTH"));
        let mut second = ResultExecute::new();
        second.add_error(error("VALID"));

        first.merge(second);
        assert_eq!(first.codes(), vec!["AUTH", "VALID"]);
    }

    #[test]
    fn test_into_resource() {
        let mut result = ResultExecute::new();
        let mut entity = Entity::new("article");
        entity.set("title", json!("foo"));
        result.add_resource(entity);

        let entity = result.into_resource().unwrap();
        assert_eq!(entity.get("title"), Some(json!("foo")));
    }

    #[test]
    fn test_serializes() {
        let mut result = ResultExecute::new();
        result.add_error(error("A"));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["errors"][0]["code"], "A");
        assert_eq!(json["resources"], json!([]));
    }
}
