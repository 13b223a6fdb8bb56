use serde::Deserialize;
use serde_json::Value;

/// Parsed body of a classification response.
///
/// The service is an external party, so the payload is kept as raw JSON and
/// every accessor checks the shape it expects instead of failing on it.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationResult {
    raw: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntentEntry {
    Name(String),
    Object {
        slug: Option<String>,
        name: Option<String>,
    },
}

impl ClassificationResult {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body).map(Self::new)
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// The `results` member, unless it is missing or falsy.
    pub fn results(&self) -> Option<&Value> {
        self.raw.get("results").filter(|v| is_truthy(v))
    }

    /// Raw `results.intents` entries, best first. Empty when the list is
    /// missing or not an array.
    pub fn intent_entries(&self) -> &[Value] {
        self.results()
            .and_then(|r| r.get("intents"))
            .and_then(Value::as_array)
            .map_or(&[], Vec::as_slice)
    }

    pub fn has_intents(&self) -> bool {
        !self.intent_entries().is_empty()
    }

    /// Names of the entries that carry one, in ranked order. Entries without a
    /// usable name are left out, so this is for display, not for picking the
    /// best match.
    pub fn intents(&self) -> Vec<String> {
        self.intent_entries()
            .iter()
            .filter_map(intent_name)
            .collect()
    }

    /// Name of the highest-ranked entry. `None` when the list is empty or the
    /// first entry has no usable name; lower-ranked entries are never promoted.
    pub fn top_intent(&self) -> Option<String> {
        self.intent_entries().first().and_then(intent_name)
    }

    /// True when the payload signals failure: `results.error` is truthy or
    /// `results` itself is absent.
    pub fn has_api_error(&self) -> bool {
        match self.results() {
            None => true,
            Some(results) => results.get("error").is_some_and(is_truthy),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.raw.get("message").and_then(Value::as_str)
    }
}

impl From<Value> for ClassificationResult {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

/// Name of one intent entry: the string itself, or the `slug` (then `name`)
/// of an object entry.
pub fn intent_name(entry: &Value) -> Option<String> {
    match IntentEntry::deserialize(entry).ok()? {
        IntentEntry::Name(name) => Some(name),
        IntentEntry::Object { slug, name } => slug.or(name),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
