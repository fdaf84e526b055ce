/// Page identifier used when the path has no usable segment.
pub const DEFAULT_PAGE: &str = "index.html";

/// The host document's location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
        }
    }

    pub fn page_name(&self) -> String {
        page_name(&self.pathname)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

/// Last non-empty `/` segment of `path`, or `index.html`.
pub fn page_name(path: &str) -> String {
    path.split('/')
        .filter(|seg| !seg.is_empty())
        .last()
        .unwrap_or(DEFAULT_PAGE)
        .to_string()
}
