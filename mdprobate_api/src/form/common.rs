//! Shared form infrastructure: the ordered [`FormPayload`] and the hidden
//! [`ViewState`] tokens every postback has to echo back.

use serde::Serialize;

/// Name (and element id) of the opaque view-state field.
pub const VIEWSTATE_FIELD: &str = "__VIEWSTATE";
/// Name (and element id) of the view-state generator field.
pub const VIEWSTATE_GENERATOR_FIELD: &str = "__VIEWSTATEGENERATOR";
/// Name (and element id) of the event-validation field.
pub const EVENT_VALIDATION_FIELD: &str = "__EVENTVALIDATION";

/// Ordered `application/x-www-form-urlencoded` body.
///
/// Field order is preserved so payloads serialize exactly the way the
/// browser form would submit them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field, returning the payload for chaining.
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push((name.to_string(), value.into()));
        self
    }

    /// Appends a field with an empty value.
    pub fn with_empty(self, name: &str) -> Self {
        self.with_field(name, "")
    }

    /// Returns the value of the first field with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The urlencoded request body, fields in insertion order.
    pub fn to_urlencoded(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.fields {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

/// The three opaque hidden tokens the server issues with every response.
///
/// Values are carried verbatim from one response into the next request;
/// their contents are never inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub view_state: String,
    pub generator: String,
    pub event_validation: String,
}

impl ViewState {
    pub fn new(
        view_state: impl Into<String>,
        generator: impl Into<String>,
        event_validation: impl Into<String>,
    ) -> Self {
        Self {
            view_state: view_state.into(),
            generator: generator.into(),
            event_validation: event_validation.into(),
        }
    }

    /// Appends the hidden fields to the payload in the order the form declares them.
    pub fn append_to(&self, payload: FormPayload) -> FormPayload {
        payload
            .with_field(VIEWSTATE_FIELD, self.view_state.as_str())
            .with_field(VIEWSTATE_GENERATOR_FIELD, self.generator.as_str())
            .with_field(EVENT_VALIDATION_FIELD, self.event_validation.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_preserves_field_order() {
        let payload = FormPayload::new()
            .with_field("b", "2")
            .with_field("a", "1")
            .with_empty("c");
        let names: Vec<&str> = payload.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(payload.get("c"), Some(""));
        assert_eq!(payload.get("missing"), None);
    }

    #[test]
    fn urlencoding_escapes_opaque_tokens() {
        let payload = ViewState::new("/wEPDw+x=", "C2EE9ABB", "a/b").append_to(FormPayload::new());
        insta::assert_snapshot!(
            payload.to_urlencoded(),
            @"__VIEWSTATE=%2FwEPDw%2Bx%3D&__VIEWSTATEGENERATOR=C2EE9ABB&__EVENTVALIDATION=a%2Fb"
        );
    }
}
