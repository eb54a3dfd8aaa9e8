use crate::error::{Error, ErrorRepr};
use crate::expr::is_number_range;
use crate::range::{CharRange, NumberRange};
use crate::registry::{GeneratorKind, ValueSource};
use crate::{Deferred, Draw, GeneratorNode, Letters, Options, Value};
use rand::Rng;
use std::str::FromStr;

/// The kinds every registry starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, enum_iterator::Sequence)]
pub enum Builtin {
    /// `string:10-20` random letters, or `string:(expr)` the text of a nested draw.
    String,
    /// `number:0-1:precision` a real number, optionally rounded.
    Number,
    /// `int:0-10` an integer.
    Int,
    /// `char:A-Z` one character.
    Char,
    /// `boolean:0.5` `true` with the given probability.
    Boolean,
    /// `oneOf:(a):(b)` the draw of one nested expression picked at random.
    OneOf,
    /// `array:(a):(b)` the draws of every nested expression, in order.
    Array,
    /// `repeat:n:(a)` the text of `n` draws joined together.
    Repeat,
    /// `literal:json` the same parsed JSON value every time.
    Literal,
    /// `entry:prop` a random element of the `prop` option.
    Entry,
}

impl Builtin {
    pub fn all() -> impl Iterator<Item = Self> {
        enum_iterator::all::<Self>()
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Int => "int",
            Self::Char => "char",
            Self::Boolean => "boolean",
            Self::OneOf => "oneOf",
            Self::Array => "array",
            Self::Repeat => "repeat",
            Self::Literal => "literal",
            Self::Entry => "entry",
        }
    }

    const fn default_argument(&self) -> &'static str {
        match self {
            Self::String => "10-20",
            Self::Number => "0-1",
            Self::Int => "0-10",
            Self::Char => "A-Z",
            Self::Boolean => "0.5",
            Self::Entry => "collection",
            _ => "",
        }
    }
}

impl FromStr for Builtin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| Error(ErrorRepr::GeneratorNotFound(s.to_string())))
    }
}

/// The `i`th argument, with empty or missing arguments replaced by `default`.
fn arg<'a>(args: &'a [String], i: usize, default: &'a str) -> &'a str {
    match args.get(i) {
        Some(a) if !a.is_empty() => a,
        _ => default,
    }
}

fn nodes(kind: Builtin, options: &Options, args: &[String]) -> Result<Vec<GeneratorNode>, Error> {
    if args.is_empty() {
        return Err(Error::invalid_argument(
            kind.as_str(),
            "expected at least one expression",
        ));
    }
    args.iter()
        .map(|a| GeneratorNode::new(a, options))
        .collect()
}

fn number_arg(kind: Builtin, s: &str) -> Result<f64, Error> {
    s.parse::<f64>()
        .ok()
        .filter(|x| x.is_finite())
        .ok_or_else(|| Error::invalid_argument(kind.as_str(), format!("{:?} is not a number", s)))
}

impl GeneratorKind for Builtin {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn build(&self, options: &Options, args: &[String]) -> Result<Box<dyn ValueSource>, Error> {
        let first = arg(args, 0, self.default_argument());
        Ok(match self {
            Self::String if is_number_range(first) => Box::new(RandomString {
                length: first.parse()?,
                letters: options.letters.clone(),
            }),
            Self::String => Box::new(Text {
                inner: GeneratorNode::new(first, options)?,
            }),
            Self::Number => {
                let precision = match args.get(1).filter(|p| !p.is_empty()) {
                    Some(p) => Some(number_arg(*self, p)?),
                    None => None,
                };
                if precision.is_some_and(|p| p <= 0.0) {
                    return Err(Error::invalid_argument(
                        self.as_str(),
                        "precision must be positive",
                    ));
                }
                Box::new(RandomNumber {
                    range: first.parse()?,
                    precision,
                })
            }
            Self::Int => Box::new(RandomInt {
                range: first.parse()?,
            }),
            Self::Char => Box::new(RandomChar {
                range: first.parse()?,
            }),
            Self::Boolean => Box::new(RandomBool {
                bias: number_arg(*self, first)?,
            }),
            Self::OneOf => Box::new(OneOf {
                choices: nodes(*self, options, args)?,
            }),
            Self::Array => Box::new(ArrayOf {
                items: args
                    .iter()
                    .map(|a| GeneratorNode::new(a, options))
                    .collect::<Result<_, _>>()?,
            }),
            Self::Repeat => {
                let count = first.parse::<usize>().map_err(|_| {
                    Error::invalid_argument(self.as_str(), format!("{:?} is not a count", first))
                })?;
                let inner = match args.get(1) {
                    Some(expression) => GeneratorNode::new(expression, options)?,
                    None => {
                        return Err(Error::invalid_argument(
                            self.as_str(),
                            "expected an expression to repeat",
                        ))
                    }
                };
                Box::new(Repeat { count, inner })
            }
            Self::Literal => Box::new(Literal {
                value: serde_json::from_str(first)?,
            }),
            Self::Entry => Box::new(Entry {
                collection: Collection::from_option(first, options)?,
            }),
        })
    }
}

struct RandomString {
    length: NumberRange,
    letters: Letters,
}

impl ValueSource for RandomString {
    fn draw(&mut self) -> Result<Draw, Error> {
        let length = self.length.random_int().max(0);
        let s: String = (0..length).map(|_| self.letters.random()).collect();
        Ok(Deferred::Ready(Value::Str(s)))
    }
}

/// The textual form of a nested generator's draws.
struct Text {
    inner: GeneratorNode,
}

impl ValueSource for Text {
    fn draw(&mut self) -> Result<Draw, Error> {
        Ok(self.inner.resolve()?.map(|v| Value::Str(v.to_string())))
    }

    fn is_async(&self) -> bool {
        self.inner.is_async()
    }
}

struct RandomNumber {
    range: NumberRange,
    precision: Option<f64>,
}

/// Rounds `x` to `precision`.
///
/// Below 1 the precision sets a number of decimal places (`0.01` keeps two);
/// from 1 up, `x` goes to the nearest multiple of it, halves rounding up.
fn round_to(x: f64, precision: f64) -> f64 {
    if precision < 1.0 {
        let places = (-precision.log10() + 1e-9).trunc().clamp(0.0, 100.0) as usize;
        format!("{:.*}", places, x).parse().unwrap_or(x)
    } else {
        (x / precision + 0.5).floor() * precision
    }
}

impl ValueSource for RandomNumber {
    fn draw(&mut self) -> Result<Draw, Error> {
        let x = self.range.random();
        let x = match self.precision {
            Some(p) => round_to(x, p),
            None => x,
        };
        Ok(Deferred::Ready(Value::Float(x)))
    }
}

struct RandomInt {
    range: NumberRange,
}

impl ValueSource for RandomInt {
    fn draw(&mut self) -> Result<Draw, Error> {
        Ok(Deferred::Ready(Value::Int(self.range.random_int())))
    }
}

struct RandomChar {
    range: CharRange,
}

impl ValueSource for RandomChar {
    fn draw(&mut self) -> Result<Draw, Error> {
        Ok(Deferred::Ready(Value::Str(self.range.random().to_string())))
    }
}

struct RandomBool {
    bias: f64,
}

impl ValueSource for RandomBool {
    fn draw(&mut self) -> Result<Draw, Error> {
        let x: f64 = rand::rng().random();
        Ok(Deferred::Ready(Value::Bool(x < self.bias)))
    }
}

struct OneOf {
    choices: Vec<GeneratorNode>,
}

impl ValueSource for OneOf {
    fn draw(&mut self) -> Result<Draw, Error> {
        let i = rand::rng().random_range(0..self.choices.len());
        self.choices[i].resolve()
    }

    fn is_async(&self) -> bool {
        self.choices.iter().any(GeneratorNode::is_async)
    }
}

struct ArrayOf {
    items: Vec<GeneratorNode>,
}

impl ValueSource for ArrayOf {
    fn draw(&mut self) -> Result<Draw, Error> {
        let draws = self
            .items
            .iter_mut()
            .map(GeneratorNode::resolve)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Deferred::all(draws).map(Value::Array))
    }

    fn is_async(&self) -> bool {
        self.items.iter().any(GeneratorNode::is_async)
    }
}

struct Repeat {
    count: usize,
    inner: GeneratorNode,
}

impl ValueSource for Repeat {
    fn draw(&mut self) -> Result<Draw, Error> {
        let draws = (0..self.count)
            .map(|_| self.inner.resolve())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Deferred::all(draws).map(|values| {
            Value::Str(values.iter().map(ToString::to_string).collect())
        }))
    }

    fn is_async(&self) -> bool {
        self.inner.is_async()
    }
}

struct Literal {
    value: Value,
}

impl ValueSource for Literal {
    fn draw(&mut self) -> Result<Draw, Error> {
        Ok(Deferred::Ready(self.value.clone()))
    }
}

/// What `entry` picks from, flattened once when the source is built.
enum Collection {
    Items(Vec<Value>),
    Chars(Vec<char>),
}

impl Collection {
    fn from_option(prop: &str, options: &Options) -> Result<Self, Error> {
        let value = options
            .get(prop)
            .filter(|v| v.is_truthy())
            .ok_or_else(|| Error(ErrorRepr::CollectionNotFound(prop.to_string())))?;

        let collection = match value {
            Value::Array(items) => Self::Items(items.clone()),
            // a random key, then its value
            Value::Map(entries) => Self::Items(entries.values().cloned().collect()),
            Value::Str(s) => Self::Chars(s.chars().collect()),
            _ => {
                return Err(Error::invalid_argument(
                    Builtin::Entry.as_str(),
                    format!("option {:?} is not a collection", prop),
                ))
            }
        };

        if collection.len() == 0 {
            return Err(Error::invalid_argument(
                Builtin::Entry.as_str(),
                format!("collection {:?} is empty", prop),
            ));
        }
        Ok(collection)
    }

    fn len(&self) -> usize {
        match self {
            Self::Items(items) => items.len(),
            Self::Chars(chars) => chars.len(),
        }
    }
}

struct Entry {
    collection: Collection,
}

impl ValueSource for Entry {
    fn draw(&mut self) -> Result<Draw, Error> {
        let i = rand::rng().random_range(0..self.collection.len());
        let value = match &self.collection {
            Collection::Items(items) => items[i].clone(),
            Collection::Chars(chars) => Value::Str(chars[i].to_string()),
        };
        Ok(Deferred::Ready(value))
    }
}
