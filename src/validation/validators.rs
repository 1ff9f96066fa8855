//! Field validator constructors.
//!
//! Every format check below passes on an empty value so that `required` stays
//! the single source of "missing" messages when checks are chained.

use crate::core::value::Value;
use crate::validation::cpf;
use regex::Regex;

pub type ValidationError = String;
pub type Validator = Box<dyn Fn(&Value) -> Result<(), ValidationError> + Send + Sync>;

/// Run `validators` in order against `value`, returning the first error.
pub fn run_validators(validators: &[Validator], value: &Value) -> Result<(), ValidationError> {
    for validator in validators {
        validator(value)?;
    }
    Ok(())
}

/// Combine checks into one validator; the first failing check wins.
pub fn chain(validators: Vec<Validator>) -> Validator {
    Box::new(move |value: &Value| run_validators(&validators, value))
}

pub fn required(message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| {
        if value.is_empty() {
            Err(message.clone())
        } else {
            Ok(())
        }
    })
}

pub fn min_length(min_len: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match non_empty_text(value) {
        Some(text) if text.chars().count() < min_len => Err(message.clone()),
        _ => Ok(()),
    })
}

pub fn max_length(max_len: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match non_empty_text(value) {
        Some(text) if text.chars().count() > max_len => Err(message.clone()),
        _ => Ok(()),
    })
}

pub fn regex(pattern: &str, message: impl Into<String>) -> Result<Validator, regex::Error> {
    let re = Regex::new(pattern)?;
    let message = message.into();
    Ok(Box::new(move |value: &Value| match non_empty_text(value) {
        Some(text) if !re.is_match(text) => Err(message.clone()),
        _ => Ok(()),
    }))
}

/// Exactly `count` ASCII digits.
pub fn digits(count: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match non_empty_text(value) {
        Some(text) if text.len() != count || !text.bytes().all(|b| b.is_ascii_digit()) => {
            Err(message.clone())
        }
        _ => Ok(()),
    })
}

/// Brazilian CPF with valid check digits.
pub fn cpf(message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &Value| match non_empty_text(value) {
        Some(text) if !cpf::is_valid(text) => Err(message.clone()),
        _ => Ok(()),
    })
}

pub fn custom<F>(f: F, message: impl Into<String>) -> Validator
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    let message = message.into();
    Box::new(move |value: &Value| if f(value) { Ok(()) } else { Err(message.clone()) })
}

fn non_empty_text(value: &Value) -> Option<&str> {
    value.as_text().filter(|text| !text.trim().is_empty())
}
