//! Checkout form data, validation, and the submission state machine.
//!
//! The form arrives as raw strings. [`CheckoutForm::validate`] either produces
//! a [`ValidatedCheckout`] ready to be turned into an order, or a
//! [`ValidationErrors`] listing one message per failing field. Card details
//! are checked for shape only and dropped afterwards; they never leave the
//! storefront.

mod submission;
mod validation;

pub use submission::{SubmissionState, TransitionError};
pub use validation::{is_valid_card_number, is_valid_cvc, is_valid_expiry, is_valid_phone};

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cart::DeliveryMethod;
use crate::types::Email;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Form field name, e.g. `postcode` or `payment.cvc`.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// All validation failures for one checkout attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Record a failure for a field.
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_owned(),
            message: message.into(),
        });
    }

    /// True when nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The recorded failures, in form order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Message for a field, if it failed.
    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.iter().map(|e| e.field.as_str()).collect();
        write!(f, "invalid checkout fields: {}", fields.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Shipping and billing details as typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerForm {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: String,
    pub city: String,
    pub region: String,
    pub postcode: String,
    pub country: String,
    pub email: String,
    pub phone: String,
}

/// Validated shipping and billing identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postcode: String,
    pub country: String,
    pub email: Email,
    pub phone: String,
}

impl Customer {
    /// First and last name joined with a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    Paypal,
}

/// Card fields of the simulated card flow.
#[derive(Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentForm {
    pub card_number: String,
    pub name_on_card: String,
    pub expiration_date: String,
    pub cvc: String,
}

impl fmt::Debug for PaymentForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentForm")
            .field("card_number", &"[REDACTED]")
            .field("name_on_card", &self.name_on_card)
            .field("expiration_date", &"[REDACTED]")
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

/// The full checkout submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub customer: CustomerForm,
    pub delivery: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub payment: PaymentForm,
}

/// A checkout that passed validation. Card details are not carried over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    pub customer: Customer,
    pub delivery: DeliveryMethod,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Validate every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] with one entry per failing field.
    pub fn validate(&self) -> Result<ValidatedCheckout, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let customer = validation::customer(&self.customer, &mut errors);
        if self.payment_method == PaymentMethod::CreditCard {
            validation::card(&self.payment, &mut errors);
        }

        match customer {
            Some(customer) if errors.is_empty() => Ok(ValidatedCheckout {
                customer,
                delivery: self.delivery,
                payment_method: self.payment_method,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled_form() -> CheckoutForm {
        CheckoutForm {
            customer: CustomerForm {
                first_name: "Ona".to_string(),
                last_name: "Petraitė".to_string(),
                address1: "Gedimino pr. 1".to_string(),
                address2: String::new(),
                city: "Vilnius".to_string(),
                region: String::new(),
                postcode: "LT-01103".to_string(),
                country: "Lietuva".to_string(),
                email: "ona@example.com".to_string(),
                phone: "+370 600 12345".to_string(),
            },
            delivery: DeliveryMethod::Standard,
            payment_method: PaymentMethod::CreditCard,
            payment: PaymentForm {
                card_number: "1234567890123456".to_string(),
                name_on_card: "Ona Petraitė".to_string(),
                expiration_date: "09/25".to_string(),
                cvc: "123".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_form() {
        let checkout = filled_form().validate().unwrap();
        assert_eq!(checkout.customer.full_name(), "Ona Petraitė");
        assert_eq!(checkout.customer.address2, None);
        assert_eq!(checkout.customer.region, None);
        assert_eq!(checkout.customer.email.as_str(), "ona@example.com");
    }

    #[test]
    fn test_empty_customer_reports_each_required_field_once() {
        let form = CheckoutForm {
            payment_method: PaymentMethod::Paypal,
            ..CheckoutForm::default()
        };
        let errors = form.validate().unwrap_err();

        let fields: Vec<&str> = errors.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "first_name",
                "last_name",
                "address1",
                "city",
                "postcode",
                "country",
                "email",
                "phone"
            ]
        );
    }

    #[test]
    fn test_empty_card_fields_are_required() {
        let mut form = filled_form();
        form.payment = PaymentForm::default();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.for_field("payment.card_number").is_some());
        assert!(errors.for_field("payment.name_on_card").is_some());
    }

    #[test]
    fn test_paypal_skips_card_checks() {
        let mut form = filled_form();
        form.payment_method = PaymentMethod::Paypal;
        form.payment = PaymentForm::default();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_format_errors() {
        let mut form = filled_form();
        form.customer.email = "ona.example.com".to_string();
        form.customer.phone = "call me".to_string();
        form.payment.cvc = "12".to_string();
        form.payment.expiration_date = "13/25".to_string();

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.for_field("email").is_some());
        assert!(errors.for_field("phone").is_some());
        assert!(errors.for_field("payment.cvc").is_some());
        assert!(errors.for_field("payment.expiration_date").is_some());
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let mut form = filled_form();
        form.customer.city = "   ".to_string();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.for_field("city"), Some("City is required"));
    }

    #[test]
    fn test_debug_redacts_card_details() {
        let debug = format!("{:?}", filled_form().payment);
        assert!(!debug.contains("1234567890123456"));
        assert!(!debug.contains("123\""));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_form_deserializes_with_missing_sections() {
        let form: CheckoutForm =
            serde_json::from_str(r#"{"delivery": "express", "payment_method": "paypal"}"#).unwrap();
        assert_eq!(form.delivery, DeliveryMethod::Express);
        assert_eq!(form.payment_method, PaymentMethod::Paypal);
        assert_eq!(form.customer, CustomerForm::default());
    }
}
