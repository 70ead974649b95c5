//! Field checks for the checkout form.

use std::sync::LazyLock;

use regex::Regex;

use super::{Customer, CustomerForm, PaymentForm, ValidationErrors};
use crate::types::Email;

/// Sixteen ASCII digits, after whitespace has been stripped.
static CARD_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("Invalid regex"));

/// `MM/YY` or `MM/YYYY`.
static EXPIRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2}|[0-9]{4})$").expect("Invalid regex"));

static CVC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("Invalid regex"));

/// Optional leading `+`, then digits with spaces, dashes, or parentheses.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ()\-]{6,20}$").expect("Invalid regex"));

/// Whether a card number has exactly 16 digits. Spaces between groups are allowed.
#[must_use]
pub fn is_valid_card_number(raw: &str) -> bool {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    CARD_NUMBER_RE.is_match(&digits)
}

/// Whether an expiry date reads `MM/YY` or `MM/YYYY` with a real month.
#[must_use]
pub fn is_valid_expiry(raw: &str) -> bool {
    EXPIRY_RE.is_match(raw.trim())
}

/// Whether a security code has 3 or 4 digits.
#[must_use]
pub fn is_valid_cvc(raw: &str) -> bool {
    CVC_RE.is_match(raw.trim())
}

/// Whether a phone number looks dialable.
#[must_use]
pub fn is_valid_phone(raw: &str) -> bool {
    let raw = raw.trim();
    PHONE_RE.is_match(raw) && raw.chars().filter(char::is_ascii_digit).count() >= 6
}

fn required(errors: &mut ValidationErrors, field: &str, label: &str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(field, format!("{label} is required"));
        None
    } else {
        Some(value.to_owned())
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_owned())
}

pub(super) fn customer(form: &CustomerForm, errors: &mut ValidationErrors) -> Option<Customer> {
    let first_name = required(errors, "first_name", "First name", &form.first_name);
    let last_name = required(errors, "last_name", "Last name", &form.last_name);
    let address1 = required(errors, "address1", "Address", &form.address1);
    let city = required(errors, "city", "City", &form.city);
    let postcode = required(errors, "postcode", "Postal code", &form.postcode);
    let country = required(errors, "country", "Country", &form.country);

    let email = required(errors, "email", "Email", &form.email).and_then(|raw| {
        Email::parse(&raw)
            .map_err(|e| errors.push("email", format!("Email is invalid: {e}")))
            .ok()
    });

    let phone = required(errors, "phone", "Phone", &form.phone).filter(|raw| {
        let ok = is_valid_phone(raw);
        if !ok {
            errors.push("phone", "Phone number is invalid");
        }
        ok
    });

    let (
        Some(first_name),
        Some(last_name),
        Some(address1),
        Some(city),
        Some(postcode),
        Some(country),
        Some(email),
        Some(phone),
    ) = (first_name, last_name, address1, city, postcode, country, email, phone)
    else {
        return None;
    };

    Some(Customer {
        first_name,
        last_name,
        address1,
        address2: optional(&form.address2),
        city,
        region: optional(&form.region),
        postcode,
        country,
        email,
        phone,
    })
}

pub(super) fn card(form: &PaymentForm, errors: &mut ValidationErrors) {
    if let Some(number) = required(errors, "payment.card_number", "Card number", &form.card_number)
        && !is_valid_card_number(&number)
    {
        errors.push("payment.card_number", "Card number must have 16 digits");
    }

    let _ = required(errors, "payment.name_on_card", "Name on card", &form.name_on_card);

    if let Some(expiry) = required(
        errors,
        "payment.expiration_date",
        "Expiration date",
        &form.expiration_date,
    ) && !is_valid_expiry(&expiry)
    {
        errors.push("payment.expiration_date", "Expiration date must be MM/YY");
    }

    if let Some(cvc) = required(errors, "payment.cvc", "CVC", &form.cvc)
        && !is_valid_cvc(&cvc)
    {
        errors.push("payment.cvc", "CVC must have 3 or 4 digits");
    }
}
