//! Front-matter parsing

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Line closing an unfenced metadata block
const END_MARKER: &str = "!END";

/// Custom deserializer that handles both a single string and a list of strings
pub(crate) fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<serde_yaml::Value>()? {
                match item {
                    serde_yaml::Value::String(s) => vec.push(s),
                    serde_yaml::Value::Number(n) => vec.push(n.to_string()),
                    serde_yaml::Value::Bool(b) => vec.push(b.to_string()),
                    serde_yaml::Value::Null => {}
                    _ => {
                        return Err(de::Error::custom(
                            "expected a string, number or boolean in the list",
                        ))
                    }
                }
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// A title may be written as a list of lines; they are joined back together.
fn joined_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let parts = string_or_vec(deserializer)?;
    let joined = parts.concat();
    Ok(if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    })
}

/// Metadata block of a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(deserialize_with = "joined_string", default)]
    pub title: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,

    /// Keys this site does not interpret
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Metadata {
    /// Parse a metadata block. Blank blocks yield empty metadata.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}

/// Split a post into its metadata block (if any) and its body.
///
/// Two block forms are recognised: YAML fenced by `---` lines at the very
/// top of the file, and YAML followed by a line reading `!END`.
pub fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    if let Some(split) = split_fenced(content) {
        return split;
    }
    if let Some(split) = split_end_marker(content) {
        return split;
    }
    (None, content)
}

fn split_fenced(content: &str) -> Option<(Option<&str>, &str)> {
    let trimmed = content.trim_start_matches(['\n', '\r']);
    let rest = trimmed.strip_prefix("---")?;
    // The opening fence must be a line of its own
    if !(rest.starts_with('\n') || rest.starts_with("\r\n")) {
        return None;
    }
    let rest = rest.trim_start_matches(['\n', '\r']);

    // Empty block: `---` immediately followed by the closing fence
    if let Some(body) = rest.strip_prefix("---") {
        return Some((Some(""), body.trim_start_matches(['\n', '\r'])));
    }

    let end_pos = rest.find("\n---")?;
    let yaml = &rest[..end_pos];
    if !looks_like_yaml(yaml) {
        return None;
    }

    let remaining = &rest[end_pos + 4..];
    // Skip the remainder of the closing fence line
    let remaining = match remaining.find('\n') {
        Some(nl) if remaining[..nl].trim().is_empty() => &remaining[nl + 1..],
        None if remaining.trim().is_empty() => "",
        _ => remaining,
    };
    Some((Some(yaml), remaining.trim_start_matches(['\n', '\r'])))
}

fn split_end_marker(content: &str) -> Option<(Option<&str>, &str)> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim_end() == END_MARKER {
            let yaml = &content[..offset];
            let body = &content[offset + line.len()..];
            return Some((Some(yaml), body));
        }
        offset += line.len();
    }
    None
}

/// A `---` fence is also a markdown horizontal rule. Only treat the fenced
/// text as metadata when at least one line has the `key: value` shape.
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp");
        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}
