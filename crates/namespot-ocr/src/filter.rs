/// Restricts the recognizable alphabet and fixes the layout assumption.
///
/// The default set covers the characters personal names are built from:
/// letters, spaces, periods, hyphens, apostrophes. Layout is a single
/// uniform block of text (Tesseract PSM 6).
#[derive(Debug, Clone, PartialEq)]
pub struct AlphabetFilter {
    whitelist: String,
}

impl AlphabetFilter {
    pub fn new(whitelist: impl Into<String>) -> Self {
        Self {
            whitelist: whitelist.into(),
        }
    }

    pub fn whitelist(&self) -> &str {
        &self.whitelist
    }
}

impl Default for AlphabetFilter {
    fn default() -> Self {
        let mut whitelist = String::new();
        whitelist.extend('A'..='Z');
        whitelist.extend('a'..='z');
        whitelist.push_str(" .-'");
        Self { whitelist }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_whitelist_covers_name_characters() {
        let filter = AlphabetFilter::default();
        for ch in ['A', 'z', ' ', '.', '-', '\''] {
            assert!(filter.whitelist().contains(ch), "missing {ch:?}");
        }
        assert!(!filter.whitelist().contains('3'));
    }
}
