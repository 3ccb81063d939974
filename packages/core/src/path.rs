//! Dot-delimited path type addressing locations in a state tree.

use std::fmt;

/// A location in a nested state tree, addressed by dot-separated segments.
///
/// The empty path addresses the whole tree. Parsing is infallible by
/// design: a path that addresses nothing simply resolves to nothing, it
/// never raises.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub segments: Vec<String>,
}

impl Path {
    /// The root path, addressing the whole tree.
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
        }
    }

    /// Parse a dot-separated path string.
    ///
    /// Empty segments are dropped, so `"a..b"` and `"a.b."` both normalize
    /// to `"a.b"`, and the empty string is the root path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pathstate_core::Path;
    ///
    /// let path = Path::parse("form.fields.name");
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(Path::parse("a.b."), Path::parse("a.b"));
    /// ```
    pub fn parse(s: &str) -> Self {
        Path {
            segments: s
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_string())
                .collect(),
        }
    }

    /// Create a path from pre-split segments.
    pub fn from_segments(segments: Vec<String>) -> Self {
        Path { segments }
    }

    /// Check if this is the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Iterate over segments.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &String> {
        self.segments.iter()
    }

    /// Append a single segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Path {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Path { segments }
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path { segments }
    }

    /// Check if `prefix`'s segments are an initial run of this path's
    /// segments. Every path starts with the root path.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        prefix.segments.len() <= self.segments.len()
            && prefix.segments == self.segments[..prefix.segments.len()]
    }

    /// The path one segment shorter, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Path> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Path {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        Path::parse(s)
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path::parse(&s)
    }
}

impl std::ops::Index<usize> for Path {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.segments[i]
    }
}

/// Macro for writing path literals.
///
/// # Example
///
/// ```rust
/// use pathstate_core::path;
///
/// let p = path!("form.fields.name");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s)
    };
}
