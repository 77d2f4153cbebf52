/// Path-suffix predicate applied to listing entries at ingestion.
///
/// Defaults to plugin (`.hpi`) and core distribution (`.war`) files.
/// Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionFilter {
    suffixes: Vec<String>,
}

impl RetentionFilter {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn retains(&self, path: &str) -> bool {
        self.suffixes.iter().any(|s| path.ends_with(s.as_str()))
    }
}

impl Default for RetentionFilter {
    fn default() -> Self {
        Self::new([".hpi", ".war"])
    }
}
