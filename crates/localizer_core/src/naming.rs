use std::collections::HashMap;

use localizer_logging::localizer_debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("url has no scheme separator: {0}")]
    MissingScheme(String),
}

/// Supplies the digits appended when two URLs map to the same file name.
pub trait DigitSource: Send {
    /// Returns a digit in `0..=9`.
    fn next_digit(&mut self) -> u8;
}

/// Deterministic counter cycling through `0..=9`.
#[derive(Debug, Default, Clone)]
pub struct SequentialDigits {
    next: u8,
}

impl DigitSource for SequentialDigits {
    fn next_digit(&mut self) -> u8 {
        let digit = self.next;
        self.next = (self.next + 1) % 10;
        digit
    }
}

/// Uniformly random digits; seedable for reproducible runs.
#[derive(Debug, Clone)]
pub struct RandomDigits {
    rng: StdRng,
}

impl RandomDigits {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DigitSource for RandomDigits {
    fn next_digit(&mut self) -> u8 {
        self.rng.gen_range(0..10)
    }
}

/// Base file name for a URL: scheme stripped, every byte outside
/// `[A-Za-z0-9_.-]` replaced with `_`.
pub fn candidate_name(url: &str) -> Result<String, NameError> {
    let rest = match url.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => rest,
        _ => return Err(NameError::MissingScheme(url.to_string())),
    };
    Ok(rest
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect())
}

/// Who holds a file name during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Claim {
    /// Referenced by an element that is already local; free for the URL whose
    /// base name it is, taken for every other URL.
    Local(String),
    /// Assigned to a URL in this run.
    Url,
}

/// Assigns one unique local file name per distinct source URL.
///
/// Names collide on exact equality. [`NameResolver::with_case_folding`]
/// compares them ignoring ASCII case instead, for download folders on
/// case-insensitive filesystems.
pub struct NameResolver {
    digits: Box<dyn DigitSource>,
    fold_case: bool,
    by_url: HashMap<String, String>,
    taken: HashMap<String, Claim>,
}

impl NameResolver {
    pub fn new(digits: impl DigitSource + 'static) -> Self {
        Self {
            digits: Box::new(digits),
            fold_case: false,
            by_url: HashMap::new(),
            taken: HashMap::new(),
        }
    }

    pub fn with_case_folding(mut self) -> Self {
        self.fold_case = true;
        self
    }

    /// Records a name that an already-local element points to.
    pub fn reserve(&mut self, name: &str) {
        let key = self.key(name);
        self.taken
            .entry(key)
            .or_insert_with(|| Claim::Local(name.to_string()));
    }

    /// Returns the file name for `url`, assigning a fresh one on first sight.
    ///
    /// A reserved name equal to the URL's base name goes to that URL, so a
    /// file written by an earlier run is found again.
    pub fn resolve(&mut self, url: &str) -> Result<String, NameError> {
        if let Some(existing) = self.by_url.get(url) {
            return Ok(existing.clone());
        }

        let base = candidate_name(url)?;
        let claimable = match self.taken.get(&self.key(&base)) {
            None => true,
            Some(Claim::Local(reserved)) => *reserved == base,
            Some(Claim::Url) => false,
        };

        let mut name = base.clone();
        if !claimable {
            while self.taken.contains_key(&self.key(&name)) {
                name.push('_');
                name.push(char::from(b'0' + self.digits.next_digit() % 10));
            }
            localizer_debug!("name collision for {}: {} -> {}", url, base, name);
        }

        self.taken.insert(self.key(&name), Claim::Url);
        self.by_url.insert(url.to_string(), name.clone());
        Ok(name)
    }

    fn key(&self, name: &str) -> String {
        if self.fold_case {
            name.to_ascii_lowercase()
        } else {
            name.to_string()
        }
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new(SequentialDigits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_and_replaces_unsafe_chars() {
        assert_eq!(
            candidate_name("https://cdn.example.com/a.png").unwrap(),
            "cdn.example.com_a.png"
        );
        assert_eq!(
            candidate_name("https://x.com/p?q=1&r=ü").unwrap(),
            "x.com_p_q_1_r__"
        );
    }

    #[test]
    fn url_without_scheme_is_rejected() {
        assert_eq!(
            candidate_name("cdn.example.com/a.png"),
            Err(NameError::MissingScheme("cdn.example.com/a.png".into()))
        );
        assert!(candidate_name("https://").is_err());
    }

    #[test]
    fn same_url_resolves_to_same_name() {
        let mut resolver = NameResolver::default();
        let first = resolver.resolve("https://a.com/x").unwrap();
        let second = resolver.resolve("https://a.com/x").unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "a.com_x");
    }

    #[test]
    fn colliding_urls_get_digit_suffixes() {
        let mut resolver = NameResolver::default();
        let a = resolver.resolve("https://a.com/x?y").unwrap();
        let b = resolver.resolve("http://a.com/x_y").unwrap();
        let c = resolver.resolve("ftp://a.com/x/y").unwrap();
        assert_eq!(a, "a.com_x_y");
        assert_eq!(b, "a.com_x_y_0");
        assert_eq!(c, "a.com_x_y_1");
    }

    #[test]
    fn suffix_keeps_growing_until_unique() {
        let mut resolver = NameResolver::new(SequentialDigits::default());
        resolver.reserve("a.com_x_0");
        assert_eq!(resolver.resolve("https://a.com/x").unwrap(), "a.com_x");
        assert_eq!(resolver.resolve("http://a.com/x").unwrap(), "a.com_x_0_1");
    }

    #[test]
    fn reserved_base_name_goes_back_to_its_url() {
        let mut resolver = NameResolver::default();
        resolver.reserve("a.com_x.png");
        assert_eq!(resolver.resolve("https://a.com/x.png").unwrap(), "a.com_x.png");
        assert_eq!(resolver.resolve("http://a.com/x.png").unwrap(), "a.com_x.png_0");
    }

    #[test]
    fn reserved_suffixed_name_is_never_assigned() {
        let mut resolver = NameResolver::default();
        resolver.reserve("a.com_x_0");
        resolver.resolve("https://a.com/x").unwrap();
        assert_ne!(resolver.resolve("ftp://a.com/x").unwrap(), "a.com_x_0");
    }

    #[test]
    fn names_differing_in_case_are_distinct_by_default() {
        let mut resolver = NameResolver::default();
        assert_eq!(resolver.resolve("https://a.com/A.png").unwrap(), "a.com_A.png");
        assert_eq!(resolver.resolve("https://a.com/a.png").unwrap(), "a.com_a.png");
    }

    #[test]
    fn case_folding_makes_case_variants_collide() {
        let mut resolver = NameResolver::default().with_case_folding();
        let upper = resolver.resolve("https://a.com/A.png").unwrap();
        let lower = resolver.resolve("https://a.com/a.png").unwrap();
        assert_eq!(upper, "a.com_A.png");
        assert_eq!(lower, "a.com_a.png_0");
    }
}
