use std::collections::BTreeMap;
use std::fmt;
use time::PrimitiveDateTime;

/// A template value. Formatting always goes through its [`Display`](fmt::Display) form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i64),
}
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
        }
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value.into())
    }
}
impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Integer(value.into())
    }
}
impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::Integer(value.into())
    }
}

/// Named run-time facts that placeholders resolve against.
///
/// Owned by whoever drives a workflow run and filled in as facts become known;
/// resolution only ever reads it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, Value>,
}
impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sets `{prefix}_year`, `_month`, `_day`, `_hour`, `_minute` and `_second`
    /// as integers. They are not zero-padded: `{prefix_month:2:>:0}` does that.
    pub fn insert_datetime(&mut self, prefix: &str, moment: PrimitiveDateTime) -> &mut Self {
        self.insert(format!("{prefix}_year"), moment.year())
            .insert(format!("{prefix}_month"), u8::from(moment.month()))
            .insert(format!("{prefix}_day"), moment.day())
            .insert(format!("{prefix}_hour"), moment.hour())
            .insert(format!("{prefix}_minute"), moment.minute())
            .insert(format!("{prefix}_second"), moment.second())
    }

    /// Resolves every placeholder of `text` against this context, logging the
    /// ones that fail. See [`resolve`](crate::resolve).
    pub fn resolve(&self, text: &str) -> String {
        crate::resolve::resolve(text, self)
    }
}
impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Context {
    /// Later entries win.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}
impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        context.extend(iter);
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("abc").to_string(), "abc");
        assert_eq!(Value::from(600_u32).to_string(), "600");
        assert_eq!(Value::from(-4).to_string(), "-4");
    }

    #[test]
    fn test_later_entries_win() {
        let mut context: Context = [("a", "1"), ("b", "2")].into_iter().collect();
        context.extend([("b", "3")]);
        assert_eq!(context.get("a"), Some(&Value::from("1")));
        assert_eq!(context.get("b"), Some(&Value::from("3")));
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn test_insert_datetime() {
        let mut context = Context::new();
        context.insert_datetime("digitization", datetime!(2024-03-07 09:05:01));
        assert_eq!(context.get("digitization_year"), Some(&Value::Integer(2024)));
        assert_eq!(context.get("digitization_month"), Some(&Value::Integer(3)));
        assert_eq!(context.get("digitization_day"), Some(&Value::Integer(7)));
        assert_eq!(context.get("digitization_hour"), Some(&Value::Integer(9)));
        assert_eq!(context.get("digitization_minute"), Some(&Value::Integer(5)));
        assert_eq!(context.get("digitization_second"), Some(&Value::Integer(1)));
    }
}
