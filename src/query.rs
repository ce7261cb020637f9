use nom::{
    character::complete::{digit1, multispace0, one_of},
    combinator::{opt, recognize},
    sequence::{pair, preceded},
    IResult,
};
use std::convert::Infallible;
use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;
use url::{form_urlencoded, Url};

pub const YEAR_KEY: &str = "year";
pub const MONTH_KEY: &str = "month";

fn leading_int(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, recognize(pair(opt(one_of("+-")), digit1)))(input)
}

/// Reads the integer a parameter value starts with. Anything after the
/// digits is ignored, so `"7abc"` reads as `7` while `"abc"` yields `None`.
pub fn parse_int_param(value: &str) -> Option<i64> {
    let (_, digits) = leading_int(value).ok()?;
    digits.parse().ok()
}

/// The query string of a page address as an ordered list of
/// `application/x-www-form-urlencoded` pairs.
///
/// Names may repeat. Lookups see the first occurrence only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryState {
    pairs: Vec<(String, String)>,
}

impl QueryState {
    pub fn new() -> Self {
        QueryState::default()
    }

    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        form_urlencoded::parse(query.as_bytes()).into_owned().collect()
    }

    pub fn from_url(url: &Url) -> Self {
        url.query_pairs().into_owned().collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(parse_int_param)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Overwrites the first `key` in place and drops any later duplicates.
    /// Appends the pair if `key` is not present yet.
    pub fn set<V: ToString>(&mut self, key: &str, value: V) {
        let mut value = Some(value.to_string());

        self.pairs = std::mem::take(&mut self.pairs)
            .into_iter()
            .filter_map(|(k, v)| {
                if k != key {
                    Some((k, v))
                } else {
                    value.take().map(|value| (k, value))
                }
            })
            .collect();

        if let Some(value) = value {
            self.pairs.push((key.to_owned(), value));
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    /// Sets every key with a non-empty value and removes every key whose
    /// value is missing or empty. All other parameters stay untouched.
    pub fn replace<'k, I>(&mut self, params: I)
    where
        I: IntoIterator<Item = (&'k str, Option<String>)>,
    {
        for (key, value) in params {
            match value.filter(|v| !v.is_empty()) {
                Some(value) => self.set(key, value),
                None => self.remove(key),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Replaces the query of `url` with this state. Path and fragment are kept.
    pub fn apply_to(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(self.iter());
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        QueryState {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl FromStr for QueryState {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(QueryState::parse(s))
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish();
        f.write_str(&encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_params_read_leading_digits() {
        assert_eq!(parse_int_param("2030"), Some(2030));
        assert_eq!(parse_int_param("  7"), Some(7));
        assert_eq!(parse_int_param("-3"), Some(-3));
        assert_eq!(parse_int_param("+4"), Some(4));
        assert_eq!(parse_int_param("12.5"), Some(12));
        assert_eq!(parse_int_param("7abc"), Some(7));
    }

    #[test]
    fn int_params_reject_garbage() {
        assert_eq!(parse_int_param(""), None);
        assert_eq!(parse_int_param("abc"), None);
        assert_eq!(parse_int_param("-"), None);
        assert_eq!(parse_int_param("x12"), None);
        assert_eq!(parse_int_param("99999999999999999999999"), None);
    }

    #[test]
    fn parse_decodes_pairs() {
        let query = QueryState::parse("?year=2024&note=a+b%21&month=7");
        assert_eq!(query.len(), 3);
        assert_eq!(query.get("note"), Some("a b!"));
        assert_eq!(query.get_int(YEAR_KEY), Some(2024));
        assert_eq!(query.get_int(MONTH_KEY), Some(7));
        assert_eq!(query.get("missing"), None);
    }

    #[test]
    fn set_overwrites_first_and_drops_duplicates() {
        let mut query = QueryState::parse("month=1&view=grid&month=2");
        query.set(MONTH_KEY, 5);
        assert_eq!(query.to_string(), "month=5&view=grid");

        query.set(YEAR_KEY, 2024);
        assert_eq!(query.to_string(), "month=5&view=grid&year=2024");
    }

    #[test]
    fn remove_drops_every_occurrence() {
        let mut query = QueryState::parse("year=1&a=b&year=2");
        query.remove(YEAR_KEY);
        assert!(!query.contains_key(YEAR_KEY));
        assert_eq!(query.to_string(), "a=b");
    }

    #[test]
    fn replace_sets_or_removes() {
        let mut query = QueryState::parse("page=2&q=old&sort=asc");
        query.replace(vec![
            ("page", Some("3".to_owned())),
            ("q", Some(String::new())),
            ("sort", None),
            ("absent", None),
        ]);
        assert_eq!(query.to_string(), "page=3");
    }

    #[test]
    fn apply_to_keeps_path_and_fragment() {
        let mut url = Url::parse("https://example.org/journal/?year=2024#top").unwrap();
        let mut query = QueryState::from_url(&url);
        query.set(MONTH_KEY, 3);
        query.apply_to(&mut url);
        assert_eq!(
            url.as_str(),
            "https://example.org/journal/?year=2024&month=3#top"
        );
    }

    #[test]
    fn empty_state_leaves_no_question_mark() {
        let mut url = Url::parse("https://example.org/journal/?year=2024").unwrap();
        let mut query = QueryState::from_url(&url);
        query.remove(YEAR_KEY);
        query.apply_to(&mut url);
        assert_eq!(url.as_str(), "https://example.org/journal/");
        assert!(query.is_empty());
    }
}
