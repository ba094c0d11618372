//! SDP attribute lines (`a=`).

/// An `a=` line: either a flag (`a=sendrecv`) or a name/value pair
/// (`a=mid:0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

impl Attribute {
    /// Name/value attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Flag attribute without a value.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Parses the part after `a=`. Only the first `:` separates name and value.
    pub fn parse(value: &str) -> Self {
        match value.split_once(':') {
            Some((name, val)) => Self::new(name, val),
            None => Self::flag(value),
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            Some(val) => write!(f, "a={}:{}\r\n", self.name, val),
            None => write!(f, "a={}\r\n", self.name),
        }
    }
}
