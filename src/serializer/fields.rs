//! Field-level parsing shared by the entity serializers.
//!
//! [`FieldReader`] walks a JSON object one declared field at a time and
//! records a message for every field that fails, so a single call reports
//! all problems at once.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use validator::ValidateEmail;

use super::{NON_FIELD_ERRORS, ValidationErrors};

/// Total significant digits allowed in a money field.
pub const MAX_DIGITS: u32 = 10;

/// Fractional digits allowed in (and always rendered for) a money field.
pub const DECIMAL_PLACES: u32 = 2;

/// Accepted input and output format of date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_A_NUMBER: &str = "A valid number is required.";
const NOT_AN_EMAIL: &str = "Enter a valid email address.";
const BAD_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";

/// Outcome of reading one field from the input object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    /// The key is not present in the input.
    Absent,
    /// The key is present but its value failed validation (already recorded).
    Rejected,
    /// The key is present and valid.
    Valid(T),
}

impl<T> Parsed<T> {
    fn then<U>(self, f: impl FnOnce(T) -> Parsed<U>) -> Parsed<U> {
        match self {
            Self::Absent => Parsed::Absent,
            Self::Rejected => Parsed::Rejected,
            Self::Valid(value) => f(value),
        }
    }
}

/// Reads typed fields out of a JSON object, accumulating errors.
#[derive(Debug)]
pub struct FieldReader<'a> {
    data: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    /// Wraps the input, which must be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a `non_field_errors` entry when `data` is not an object.
    pub fn new(data: &'a Value) -> Result<Self, ValidationErrors> {
        match data {
            Value::Object(map) => Ok(Self {
                data: map,
                errors: ValidationErrors::new(),
            }),
            other => Err(ValidationErrors::single(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    type_name(other)
                ),
            )),
        }
    }

    /// Text field: strings are trimmed, numbers are stringified, blank is
    /// rejected, and `max_length` is counted in characters.
    pub fn char_field(&mut self, name: &str, max_length: Option<usize>) -> Parsed<String> {
        self.raw(name).then(|value| {
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return self.reject(name, NOT_A_STRING),
            };
            if text.is_empty() {
                return self.reject(name, NOT_BLANK);
            }
            if let Some(max) = max_length
                && text.chars().count() > max
            {
                return self.reject(
                    name,
                    format!("Ensure this field has no more than {max} characters."),
                );
            }
            Parsed::Valid(text)
        })
    }

    /// Text field that must also be a syntactically valid email address.
    pub fn email_field(&mut self, name: &str, max_length: usize) -> Parsed<String> {
        self.char_field(name, Some(max_length)).then(|email| {
            if email.validate_email() && has_top_level_domain(&email) {
                Parsed::Valid(email)
            } else {
                self.reject(name, NOT_AN_EMAIL)
            }
        })
    }

    /// Fixed-point field with [`MAX_DIGITS`] total and [`DECIMAL_PLACES`]
    /// fractional digits. Accepts JSON numbers and numeric strings; the
    /// result always carries exactly [`DECIMAL_PLACES`] fractional digits.
    pub fn decimal_field(&mut self, name: &str) -> Parsed<Decimal> {
        self.raw(name).then(|value| {
            let parsed = match value {
                Value::Number(n) => parse_decimal(&n.to_string()),
                Value::String(s) => parse_decimal(s.trim()),
                _ => Err(NOT_A_NUMBER.to_string()),
            };
            let mut number = match parsed {
                Ok(number) => number,
                Err(message) => return self.reject(name, message),
            };
            if let Err(message) = check_precision(number) {
                return self.reject(name, message);
            }
            number.rescale(DECIMAL_PLACES);
            Parsed::Valid(number)
        })
    }

    /// Calendar date in [`DATE_FORMAT`].
    pub fn date_field(&mut self, name: &str) -> Parsed<NaiveDate> {
        self.raw(name).then(|value| match value {
            Value::String(s) => match NaiveDate::parse_from_str(s.trim(), DATE_FORMAT) {
                Ok(date) => Parsed::Valid(date),
                Err(_) => self.reject(name, BAD_DATE),
            },
            _ => self.reject(name, BAD_DATE),
        })
    }

    /// Value restricted to the variants `T` can parse; the parse error's
    /// message is recorded verbatim.
    pub fn choice_field<T>(&mut self, name: &str) -> Parsed<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.raw(name).then(|value| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            match text.parse::<T>() {
                Ok(choice) => Parsed::Valid(choice),
                Err(e) => self.reject(name, e.to_string()),
            }
        })
    }

    /// Primary key of a related record: an integer, an integral float such
    /// as `1.0`, or an integer string.
    ///
    /// Only the type is checked here; whether the record exists is decided
    /// by the store.
    pub fn pk_field(&mut self, name: &str) -> Parsed<i64> {
        self.raw(name).then(|value| {
            let pk = match value {
                Value::Number(n) => n.as_i64().or_else(|| integral(n.as_f64()?)),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            };
            match pk {
                Some(pk) => Parsed::Valid(pk),
                None => self.reject(
                    name,
                    format!(
                        "Incorrect type. Expected pk value, received {}.",
                        type_name(value)
                    ),
                ),
            }
        })
    }

    /// Settles a parsed field.
    ///
    /// An absent field takes `fallback` (the current value on partial
    /// update, or a default); with no fallback it is reported as required.
    pub fn resolve<T>(&mut self, name: &str, parsed: Parsed<T>, fallback: Option<T>) -> Option<T> {
        match parsed {
            Parsed::Valid(value) => Some(value),
            Parsed::Rejected => None,
            Parsed::Absent => {
                if fallback.is_none() {
                    self.errors.add(name, REQUIRED);
                }
                fallback
            }
        }
    }

    /// Returns everything recorded so far.
    #[must_use]
    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    fn raw(&mut self, name: &str) -> Parsed<&'a Value> {
        let data = self.data;
        match data.get(name) {
            None => Parsed::Absent,
            Some(Value::Null) => self.reject(name, NOT_NULL),
            Some(value) => Parsed::Valid(value),
        }
    }

    fn reject<T>(&mut self, name: &str, message: impl Into<String>) -> Parsed<T> {
        self.errors.add(name, message);
        Parsed::Rejected
    }
}

/// The domain must be `localhost`, an address literal, or end in a label of
/// at least two letters (or a punycode `xn--` label).
fn has_top_level_domain(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.eq_ignore_ascii_case("localhost") || domain.starts_with('[') {
        return true;
    }
    let Some((_, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    if tld.len() > 4 && tld.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("xn--")) {
        return true;
    }
    tld.chars().count() >= 2
        && !tld.starts_with('-')
        && !tld.ends_with('-')
        && tld.chars().all(|c| c.is_alphabetic() || c == '-')
}

/// Numeric literals too wide for [`Decimal`] are still numbers; they fail
/// on digit count rather than syntax.
fn parse_decimal(text: &str) -> Result<Decimal, String> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| {
            if is_numeric_literal(text) {
                too_many_digits()
            } else {
                NOT_A_NUMBER.to_string()
            }
        })
}

fn is_numeric_literal(text: &str) -> bool {
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (unsigned, None),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mantissa_ok =
        !(whole.is_empty() && fraction.is_empty()) && all_digits(whole) && all_digits(fraction);
    let exponent_ok = exponent.is_none_or(|e| {
        let e = e.strip_prefix(['-', '+']).unwrap_or(e);
        !e.is_empty() && all_digits(e)
    });
    mantissa_ok && exponent_ok
}

fn too_many_digits() -> String {
    format!("Ensure that there are no more than {MAX_DIGITS} digits in total.")
}

/// Checks total, fractional and whole digit counts, in that order.
fn check_precision(value: Decimal) -> Result<(), String> {
    let places = value.scale();
    let digits = value
        .mantissa()
        .unsigned_abs()
        .checked_ilog10()
        .map_or(1, |d| d + 1);
    let (total, whole) = if places == 0 {
        (digits, digits)
    } else if digits > places {
        (digits, digits - places)
    } else {
        (places, 0)
    };

    if total > MAX_DIGITS {
        return Err(too_many_digits());
    }
    if places > DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {DECIMAL_PLACES} decimal places."
        ));
    }
    let max_whole = MAX_DIGITS - DECIMAL_PLACES;
    if whole > max_whole {
        return Err(format!(
            "Ensure that there are no more than {max_whole} digits before the decimal point."
        ));
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn integral(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::BookingStatus;
    use serde_json::json;

    fn reader(data: &Value) -> FieldReader<'_> {
        let Ok(reader) = FieldReader::new(data) else {
            panic!("input is an object");
        };
        reader
    }

    fn first_error(reader: FieldReader<'_>, field: &str) -> String {
        let errors = reader.into_errors();
        let Some(message) = errors.get(field).and_then(<[String]>::first) else {
            panic!("expected an error for {field}");
        };
        message.clone()
    }

    #[test]
    fn rejects_non_object_input() {
        let Err(errors) = FieldReader::new(&json!([1, 2])) else {
            panic!("arrays are not accepted");
        };
        assert_eq!(
            errors.get(NON_FIELD_ERRORS),
            Some(&["Invalid data. Expected a dictionary, but got list.".to_string()][..])
        );
    }

    #[test]
    fn char_field_trims_and_limits() {
        let data = json!({"title": "  Cabin  ", "long": "x".repeat(256), "blank": "   "});
        let mut r = reader(&data);
        assert_eq!(
            r.char_field("title", Some(255)),
            Parsed::Valid("Cabin".to_string())
        );
        assert_eq!(r.char_field("long", Some(255)), Parsed::Rejected);
        assert_eq!(r.char_field("blank", None), Parsed::Rejected);
        assert_eq!(r.char_field("missing", None), Parsed::Absent);

        let errors = r.into_errors();
        assert_eq!(
            errors.get("long"),
            Some(&["Ensure this field has no more than 255 characters.".to_string()][..])
        );
        assert_eq!(
            errors.get("blank"),
            Some(&["This field may not be blank.".to_string()][..])
        );
        assert!(errors.get("missing").is_none());
    }

    #[test]
    fn char_field_counts_characters_not_bytes() {
        let data = json!({"title": "é".repeat(255)});
        let mut r = reader(&data);
        assert!(matches!(r.char_field("title", Some(255)), Parsed::Valid(_)));
    }

    #[test]
    fn null_is_rejected() {
        let data = json!({"title": null});
        let mut r = reader(&data);
        assert_eq!(r.char_field("title", None), Parsed::Rejected);
        assert_eq!(first_error(r, "title"), "This field may not be null.");
    }

    #[test]
    fn email_field_checks_syntax() {
        let data = json!({"ok": "jo@x.com", "bad": "not-an-email"});
        let mut r = reader(&data);
        assert_eq!(
            r.email_field("ok", 254),
            Parsed::Valid("jo@x.com".to_string())
        );
        assert_eq!(r.email_field("bad", 254), Parsed::Rejected);
        assert_eq!(first_error(r, "bad"), "Enter a valid email address.");
    }

    #[test]
    fn email_field_requires_a_top_level_domain() {
        let data = json!({
            "bare": "jo@x",
            "short": "jo@x.c",
            "numeric": "jo@x.123",
            "local": "jo@localhost",
            "nested": "jo@mail.example.co.uk",
            "puny": "jo@example.xn--p1ai",
        });
        let mut r = reader(&data);
        assert_eq!(r.email_field("bare", 254), Parsed::Rejected);
        assert_eq!(r.email_field("short", 254), Parsed::Rejected);
        assert_eq!(r.email_field("numeric", 254), Parsed::Rejected);
        for ok in ["local", "nested", "puny"] {
            assert!(
                matches!(r.email_field(ok, 254), Parsed::Valid(_)),
                "{ok} should be accepted"
            );
        }
        assert_eq!(first_error(r, "short"), "Enter a valid email address.");
    }

    #[test]
    fn decimal_field_accepts_numbers_and_strings() {
        let data = json!({"a": 120, "b": "480.5", "c": 99.99});
        let mut r = reader(&data);
        let (Parsed::Valid(a), Parsed::Valid(b), Parsed::Valid(c)) =
            (r.decimal_field("a"), r.decimal_field("b"), r.decimal_field("c"))
        else {
            panic!("all three are valid decimals");
        };
        assert_eq!(a.to_string(), "120.00");
        assert_eq!(b.to_string(), "480.50");
        assert_eq!(c.to_string(), "99.99");
    }

    #[test]
    fn decimal_field_enforces_precision() {
        let data = json!({
            "garbage": "abc",
            "too_precise": "1.234",
            "too_long": "12345678901",
            "too_wide": "123456789.5",
            "huge": "1234567890123456789012345678901234567890",
            "huge_exponent": "1e40",
            "fits": "12345678.99",
        });
        let mut r = reader(&data);
        assert_eq!(r.decimal_field("garbage"), Parsed::Rejected);
        assert_eq!(r.decimal_field("too_precise"), Parsed::Rejected);
        assert_eq!(r.decimal_field("too_long"), Parsed::Rejected);
        assert_eq!(r.decimal_field("too_wide"), Parsed::Rejected);
        assert_eq!(r.decimal_field("huge"), Parsed::Rejected);
        assert_eq!(r.decimal_field("huge_exponent"), Parsed::Rejected);
        assert!(matches!(r.decimal_field("fits"), Parsed::Valid(_)));

        let errors = r.into_errors();
        assert_eq!(
            errors.get("garbage"),
            Some(&["A valid number is required.".to_string()][..])
        );
        assert_eq!(
            errors.get("too_precise"),
            Some(&["Ensure that there are no more than 2 decimal places.".to_string()][..])
        );
        for field in ["too_long", "huge", "huge_exponent"] {
            assert_eq!(
                errors.get(field),
                Some(&["Ensure that there are no more than 10 digits in total.".to_string()][..]),
                "{field}"
            );
        }
        assert_eq!(
            errors.get("too_wide"),
            Some(
                &["Ensure that there are no more than 8 digits before the decimal point."
                    .to_string()][..]
            )
        );
    }

    #[test]
    fn date_field_requires_iso_format() {
        let data = json!({"good": "2024-06-01", "bad": "06/01/2024", "num": 20240601});
        let mut r = reader(&data);
        assert_eq!(
            r.date_field("good"),
            Parsed::Valid(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default())
        );
        assert_eq!(r.date_field("bad"), Parsed::Rejected);
        assert_eq!(r.date_field("num"), Parsed::Rejected);
    }

    #[test]
    fn choice_field_uses_parse_error_message() {
        let data = json!({"status": "archived", "other": "confirmed"});
        let mut r = reader(&data);
        assert_eq!(r.choice_field::<BookingStatus>("status"), Parsed::Rejected);
        assert_eq!(
            r.choice_field::<BookingStatus>("other"),
            Parsed::Valid(BookingStatus::Confirmed)
        );
        assert_eq!(first_error(r, "status"), "\"archived\" is not a valid choice.");
    }

    #[test]
    fn pk_field_accepts_integers_only() {
        let data = json!({"a": 1, "b": "2", "c": "x", "d": true, "e": 3.0, "f": 1.5});
        let mut r = reader(&data);
        assert_eq!(r.pk_field("a"), Parsed::Valid(1));
        assert_eq!(r.pk_field("b"), Parsed::Valid(2));
        assert_eq!(r.pk_field("c"), Parsed::Rejected);
        assert_eq!(r.pk_field("d"), Parsed::Rejected);
        assert_eq!(r.pk_field("e"), Parsed::Valid(3));
        assert_eq!(r.pk_field("f"), Parsed::Rejected);

        let errors = r.into_errors();
        assert_eq!(
            errors.get("c"),
            Some(&["Incorrect type. Expected pk value, received str.".to_string()][..])
        );
        assert_eq!(
            errors.get("d"),
            Some(&["Incorrect type. Expected pk value, received bool.".to_string()][..])
        );
        assert_eq!(
            errors.get("f"),
            Some(&["Incorrect type. Expected pk value, received float.".to_string()][..])
        );
    }

    #[test]
    fn resolve_reports_required_without_fallback() {
        let data = json!({});
        let mut r = reader(&data);
        let title = r.char_field("title", None);
        assert_eq!(r.resolve("title", title, None), None);

        let status = r.choice_field::<BookingStatus>("status");
        assert_eq!(
            r.resolve("status", status, Some(BookingStatus::Pending)),
            Some(BookingStatus::Pending)
        );

        let errors = r.into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("title"),
            Some(&["This field is required.".to_string()][..])
        );
    }
}
