//! # Form Data
//!
//! Ordered name/value pairs collected from a form, sent url-encoded.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Builder form of [`FormData::append`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(name, value);
        self
    }

    /// First value submitted under `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_should_return_first_value() {
        let data = FormData::new().with("tag", "a").with("tag", "b");

        assert_eq!(data.get("tag"), Some("a"));
        assert_eq!(data.get("missing"), None);
    }

    #[test]
    fn form_data_should_serialize_as_pairs() {
        let data: FormData = [("reply_text", "Thanks!"), ("x", "1")].into_iter().collect();

        assert_eq!(
            serde_json::to_string(&data).unwrap(),
            r#"[["reply_text","Thanks!"],["x","1"]]"#
        );
    }
}
