use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version label")]
    Empty,
    #[error("version label {label:?}: component {component:?} is not a non-negative integer")]
    BadComponent { label: String, component: String },
}

/// A dotted snapshot version label such as `"3"` or `"2.10.1"`.
///
/// Ordering is numeric and component-wise, never lexicographic: `"2.10"`
/// sorts above `"2.9"` and `"10.1"` above `"9.3"`. Shorter labels sort
/// before longer ones with the same prefix (`"2" < "2.0"`). Equality and
/// hashing follow the same component view, so labels that normalize to the
/// same components (`"1.0"` and `"1.00"`) compare equal.
#[derive(Debug, Clone)]
pub struct Version {
    label: String,
    components: Vec<u64>,
}

impl Version {
    /// Parses a dot-separated sequence of non-negative integers.
    pub fn parse(label: &str) -> Result<Self, VersionError> {
        if label.is_empty() {
            return Err(VersionError::Empty);
        }
        let mut components = Vec::new();
        for part in label.split('.') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::BadComponent {
                    label: label.to_string(),
                    component: part.to_string(),
                });
            }
            let value = part
                .parse::<u64>()
                .map_err(|_| VersionError::BadComponent {
                    label: label.to_string(),
                    component: part.to_string(),
                })?;
            components.push(value);
        }
        Ok(Version {
            label: label.to_string(),
            components,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Version::parse(&label).map_err(DeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let v2_9 = Version::parse("2.9").unwrap();
        let v2_10 = Version::parse("2.10").unwrap();
        assert!(v2_10 > v2_9);

        let v9_3 = Version::parse("9.3").unwrap();
        let v10_1 = Version::parse("10.1").unwrap();
        assert!(v10_1 > v9_3);
    }

    #[test]
    fn shorter_label_sorts_before_extended_one() {
        let v2 = Version::parse("2").unwrap();
        let v2_0 = Version::parse("2.0").unwrap();
        assert!(v2 < v2_0);
    }

    #[test]
    fn equality_ignores_zero_padding() {
        let a = Version::parse("1.0").unwrap();
        let b = Version::parse("1.00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn display_keeps_original_label() {
        let v = Version::parse("3.2.1").unwrap();
        assert_eq!(v.to_string(), "3.2.1");
        assert_eq!(v.as_str(), "3.2.1");
        assert_eq!(v.components(), &[3, 2, 1]);
    }

    #[test]
    fn rejects_malformed_labels() {
        assert_eq!(Version::parse(""), Err(VersionError::Empty));
        assert!(matches!(
            Version::parse("1..2"),
            Err(VersionError::BadComponent { .. })
        ));
        assert!(matches!(
            Version::parse("1.a"),
            Err(VersionError::BadComponent { .. })
        ));
        assert!(matches!(
            Version::parse("v2"),
            Err(VersionError::BadComponent { .. })
        ));
        assert!(matches!(
            Version::parse("1.-2"),
            Err(VersionError::BadComponent { .. })
        ));
    }

    #[test]
    fn serializes_as_plain_string() {
        let v = Version::parse("2.10").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"2.10\"");
        let back: Version = serde_json::from_str("\"2.10\"").unwrap();
        assert_eq!(back, v);
        assert!(serde_json::from_str::<Version>("\"2.x\"").is_err());
    }
}
