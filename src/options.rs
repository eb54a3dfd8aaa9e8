//! Configuration shared by every generator built for one run.

use crate::error::Error;
use crate::range::CharRange;
use crate::Value;
use fxhash::FxHashMap;
use rand::Rng;
use serde::Deserialize;
use std::str::FromStr;

const DEFAULT_ITERATIONS: usize = 100;

/// The characters `string` draws from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Letters {
    /// Every character of an inclusive range, e.g. `A-Z`.
    Range(CharRange),
    /// An explicit alphabet, e.g. `ABC`.
    Alphabet(Alphabet),
}

/// A non-empty list of characters. Repeated characters are proportionally
/// more likely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Returns `None` if `chars` is empty.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Option<Self> {
        let chars: Vec<char> = chars.into_iter().collect();
        (!chars.is_empty()).then_some(Self { chars })
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn random(&self) -> char {
        self.chars[rand::rng().random_range(0..self.chars.len())]
    }
}

impl Letters {
    /// A uniform draw of one letter.
    pub fn random(&self) -> char {
        match self {
            Self::Range(r) => r.random(),
            Self::Alphabet(a) => a.random(),
        }
    }
}

impl Default for Letters {
    fn default() -> Self {
        Self::Range(CharRange::UPPERCASE)
    }
}

/// Accepts a character range (`A-F`) or any other non-empty alphabet.
impl FromStr for Letters {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(r) = s.parse::<CharRange>() {
            return Ok(Self::Range(r));
        }
        Alphabet::new(s.chars())
            .map(Self::Alphabet)
            .ok_or_else(|| Error::invalid_argument("letters", "alphabet is empty"))
    }
}

impl From<CharRange> for Letters {
    fn from(r: CharRange) -> Self {
        Self::Range(r)
    }
}

impl From<Alphabet> for Letters {
    fn from(a: Alphabet) -> Self {
        Self::Alphabet(a)
    }
}

impl TryFrom<String> for Letters {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Options handed to every generator kind when it is built.
///
/// Besides `iterations` and `letters`, any other key is a custom option,
/// e.g. the `collection` read by `entry`.
///
/// ```
/// use conjure::Options;
///
/// let options = Options::from_json(r#"{ "iterations": 5, "letters": "ABC", "ary": [1, 2] }"#).unwrap();
/// assert_eq!(options.iterations, 5);
/// assert!(options.get("ary").is_some());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// How many times the driver resolves each expression.
    pub iterations: usize,
    #[serde(deserialize_with = "deserialize_letters")]
    pub letters: Letters,
    #[serde(flatten)]
    custom: FxHashMap<String, Value>,
}

fn deserialize_letters<'de, D>(d: D) -> Result<Letters, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    Letters::try_from(s).map_err(serde::de::Error::custom)
}

impl Default for Options {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            letters: Letters::default(),
            custom: FxHashMap::default(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads options from a JSON object.
    pub fn from_json(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_letters(mut self, letters: impl Into<Letters>) -> Self {
        self.letters = letters.into();
        self
    }

    /// Sets a custom option.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    /// Returns a custom option.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.custom.get(key)
    }
}
