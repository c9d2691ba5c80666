//! printf-style output formatting
//!
//! Drawn values are exported as text using a format specifier such as `%.2f`.
//! A format string holds exactly one conversion, optionally surrounded by literal
//! text, with `%%` standing for a literal percent sign.
//!
//! # Conversions
//!
//! - `f`: fixed-point, default precision 6
//! - `e` / `E`: scientific, exponent with sign and at least two digits
//! - `d`: value rounded half away from zero to an integer, exact at any magnitude
//! - `s`: shortest representation that round-trips; integral values carry no
//!   fractional part (`71`, not `71.0`)
//!
//! Flags `-` (left-justify), `+` (always sign), ` ` (space for positive) and `0`
//! (zero padding) may precede the width.
//!
//! # Rounding
//!
//! `f`, `e` and `E` round the exact binary value of the draw, with ties going to
//! the even digit. A printf that rounds the shortest decimal form half up can
//! differ in the last digit: `%.1f` of `0.25` renders `0.2` here.
//!
//! # Example
//!
//! ```
//! use ratiogen::util::format::OutputFormat;
//!
//! let format = OutputFormat::parse("%.2f")?;
//! assert_eq!(format.render(3.14159), "3.14");
//!
//! let format = OutputFormat::parse("id-%05d")?;
//! assert_eq!(format.render(42.4), "id-00042");
//! # Ok::<(), ratiogen::error::GeneratorError>(())
//! ```

use crate::error::GeneratorError;
use std::fmt;

/// Format used when the configured specifier is empty
pub const DEFAULT_FORMAT: &str = "%f";

/// Default precision for `f`, `e` and `E`
const DEFAULT_PRECISION: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conversion {
    Fixed,
    Scientific { upper: bool },
    Integer,
    Shortest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Spec {
    left_justify: bool,
    plus_sign: bool,
    space_sign: bool,
    zero_pad: bool,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: Conversion,
}

/// A parsed output format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat {
    source: String,
    prefix: String,
    spec: Spec,
    suffix: String,
}

impl OutputFormat {
    /// Parse a format specifier
    ///
    /// An empty string means [`DEFAULT_FORMAT`].
    pub fn parse(format: &str) -> Result<Self, GeneratorError> {
        let source = if format.is_empty() { DEFAULT_FORMAT } else { format };
        let invalid = |reason: &str| GeneratorError::InvalidFormat {
            format: source.to_string(),
            reason: reason.to_string(),
        };

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut spec: Option<Spec> = None;
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                if spec.is_some() {
                    suffix.push(c);
                } else {
                    prefix.push(c);
                }
                continue;
            }

            if chars.peek() == Some(&'%') {
                chars.next();
                if spec.is_some() {
                    suffix.push('%');
                } else {
                    prefix.push('%');
                }
                continue;
            }

            if spec.is_some() {
                return Err(invalid("only one conversion is allowed"));
            }

            let mut parsed = Spec {
                left_justify: false,
                plus_sign: false,
                space_sign: false,
                zero_pad: false,
                width: None,
                precision: None,
                conversion: Conversion::Fixed,
            };

            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => parsed.left_justify = true,
                    '+' => parsed.plus_sign = true,
                    ' ' => parsed.space_sign = true,
                    '0' => parsed.zero_pad = true,
                    _ => break,
                }
                chars.next();
            }

            parsed.width = take_number(&mut chars);

            if chars.peek() == Some(&'.') {
                chars.next();
                let precision = take_number(&mut chars)
                    .ok_or_else(|| invalid("missing precision after '.'"))?;
                parsed.precision = Some(precision);
            }

            parsed.conversion = match chars.next() {
                Some('f') => Conversion::Fixed,
                Some('e') => Conversion::Scientific { upper: false },
                Some('E') => Conversion::Scientific { upper: true },
                Some('d') => Conversion::Integer,
                Some('s') => Conversion::Shortest,
                Some(other) => return Err(invalid(&format!("unsupported conversion '{}'", other))),
                None => return Err(invalid("incomplete conversion at end of format")),
            };

            if parsed.left_justify && parsed.zero_pad {
                return Err(invalid("flags '-' and '0' cannot be combined"));
            }
            if (parsed.left_justify || parsed.zero_pad) && parsed.width.is_none() {
                return Err(invalid("flags '-' and '0' require a width"));
            }
            if parsed.plus_sign && parsed.space_sign {
                return Err(invalid("flags '+' and ' ' cannot be combined"));
            }
            if parsed.conversion == Conversion::Integer && parsed.precision.is_some() {
                return Err(invalid("precision is not allowed for 'd'"));
            }

            spec = Some(parsed);
        }

        let spec = spec.ok_or_else(|| invalid("no conversion found"))?;

        Ok(Self {
            source: source.to_string(),
            prefix,
            spec,
            suffix,
        })
    }

    /// The specifier this format was parsed from
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render a value
    pub fn render(&self, value: f64) -> String {
        let spec = &self.spec;
        let signed = match spec.conversion {
            Conversion::Fixed => {
                format!("{:.*}", spec.precision.unwrap_or(DEFAULT_PRECISION), value)
            }
            Conversion::Scientific { upper } => {
                scientific(value, spec.precision.unwrap_or(DEFAULT_PRECISION), upper)
            }
            // `+ 0.0` folds -0.0 into 0.0
            Conversion::Integer => format!("{:.0}", value.round() + 0.0),
            Conversion::Shortest => {
                let text = format!("{}", value);
                match spec.precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                }
            }
        };

        let (negative, body) = match signed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, signed.as_str()),
        };

        let sign = if negative {
            "-"
        } else if spec.plus_sign {
            "+"
        } else if spec.space_sign {
            " "
        } else {
            ""
        };

        let len = sign.len() + body.len();
        let padding = spec.width.map(|w| w.saturating_sub(len)).unwrap_or(0);

        let mut out = String::with_capacity(self.prefix.len() + len + padding + self.suffix.len());
        out.push_str(&self.prefix);
        if spec.left_justify {
            out.push_str(sign);
            out.push_str(body);
            out.extend(std::iter::repeat(' ').take(padding));
        } else if spec.zero_pad {
            out.push_str(sign);
            out.extend(std::iter::repeat('0').take(padding));
            out.push_str(body);
        } else {
            out.extend(std::iter::repeat(' ').take(padding));
            out.push_str(sign);
            out.push_str(body);
        }
        out.push_str(&self.suffix);
        out
    }

    /// Recover the numeric value from a rendered string
    ///
    /// Strips the literal prefix and suffix, then parses what remains. Used by
    /// audits that only see the exported text.
    pub fn parse_value(&self, rendered: &str) -> Option<f64> {
        let inner = rendered.strip_prefix(self.prefix.as_str())?;
        let inner = inner.strip_suffix(self.suffix.as_str())?;
        inner.trim().trim_start_matches('+').parse().ok()
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            source: DEFAULT_FORMAT.to_string(),
            prefix: String::new(),
            spec: Spec {
                left_justify: false,
                plus_sign: false,
                space_sign: false,
                zero_pad: false,
                width: None,
                precision: None,
                conversion: Conversion::Fixed,
            },
            suffix: String::new(),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<usize> {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits.parse().ok()
}

// Rust renders 1.5e2; printf renders 1.500000e+02
fn scientific(value: f64, precision: usize, upper: bool) -> String {
    let rendered = format!("{:.*e}", precision, value);
    let (mantissa, exponent) = match rendered.split_once('e') {
        Some(parts) => parts,
        None => return rendered,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let marker = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}{}{}{:02}", mantissa, marker, sign, exponent.abs())
}
