//! Draft validation
//!
//! One pure function per step, selected through [`StepFields`]. Every
//! function collects all violations instead of stopping at the first.
//! Product rules report a single error on the line collection
//! ([`Field::OrderProducts`]) rather than one per line.

use crate::catalog::CatalogSnapshot;
use crate::draft::{CustomerInfo, OrderDraft, OrderLine, PaymentAttachment};
use crate::error::ValidationErrors;
use crate::pricing;
use rust_decimal::Decimal;

/// Minimum phone number length
pub const MIN_PHONE_LEN: usize = 10;

pub const MSG_NO_PRODUCTS: &str = "At least one product must be selected";
pub const MSG_DISCOUNT_EXCEEDS_SUBTOTAL: &str = "Discount cannot exceed the subtotal amount";

/// Field a validation message is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FullName,
    City,
    DeliveryAddress,
    PhoneNumber,
    OrderProducts,
    DeliveryCharge,
    PaymentScreenshot,
}

impl Field {
    /// Wire name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::City => "city",
            Self::DeliveryAddress => "delivery_address",
            Self::PhoneNumber => "phone_number",
            Self::OrderProducts => "order_products",
            Self::DeliveryCharge => "delivery_charge",
            Self::PaymentScreenshot => "payment_screenshot",
        }
    }
}

/// Fields owned by one step
#[derive(Debug, Clone, Copy)]
pub enum StepFields<'a> {
    Customer(&'a CustomerInfo),
    Products {
        lines: &'a [OrderLine],
        catalog: &'a CatalogSnapshot,
    },
    Payment {
        delivery_charge: Decimal,
        attachment: Option<&'a PaymentAttachment>,
    },
}

impl StepFields<'_> {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        match *self {
            Self::Customer(customer) => validate_customer(customer),
            Self::Products { lines, catalog } => validate_products(lines, catalog),
            Self::Payment {
                delivery_charge,
                attachment,
            } => validate_payment(delivery_charge, attachment),
        }
    }
}

fn require(errors: &mut ValidationErrors, field: Field, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

/// Step 1: name, city and address present; phone at least 10 characters
///
/// Landmark and alternate phone are free-form.
pub fn validate_customer(customer: &CustomerInfo) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    require(&mut errors, Field::FullName, &customer.full_name, "Full name is required");
    require(&mut errors, Field::City, &customer.city, "City is required");
    require(
        &mut errors,
        Field::DeliveryAddress,
        &customer.delivery_address,
        "Delivery address is required",
    );
    if customer.phone_number.trim().chars().count() < MIN_PHONE_LEN {
        errors.add(
            Field::PhoneNumber,
            format!("Phone number must be at least {MIN_PHONE_LEN} digits"),
        );
    }
    errors.into_result()
}

/// Step 2: at least one selected line, no selected line discounted past its subtotal
///
/// Lines with quantity zero are skipped entirely, including any discount
/// left on them.
pub fn validate_products(
    lines: &[OrderLine],
    catalog: &CatalogSnapshot,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut selected = lines.iter().filter(|l| l.quantity > 0).peekable();

    if selected.peek().is_none() {
        errors.add(Field::OrderProducts, MSG_NO_PRODUCTS);
        return errors.into_result();
    }

    let over_discounted = selected.any(|line| {
        let unit_price = catalog.unit_price(line.product_id).unwrap_or_default();
        line.discount < Decimal::ZERO
            || line.discount > pricing::line_subtotal(unit_price, line.quantity)
    });
    if over_discounted {
        errors.add(Field::OrderProducts, MSG_DISCOUNT_EXCEEDS_SUBTOTAL);
    }
    errors.into_result()
}

/// Step 3: delivery charge in `[0, MAX_AMOUNT]`; attachment, when present, is an image
pub fn validate_payment(
    delivery_charge: Decimal,
    attachment: Option<&PaymentAttachment>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if delivery_charge < Decimal::ZERO {
        errors.add(Field::DeliveryCharge, "Delivery charge cannot be negative");
    } else if delivery_charge > pricing::MAX_AMOUNT {
        errors.add(
            Field::DeliveryCharge,
            format!("Delivery charge cannot exceed {}", pricing::MAX_AMOUNT),
        );
    }
    if attachment.is_some_and(|a| !a.is_image()) {
        errors.add(Field::PaymentScreenshot, "Payment screenshot must be an image");
    }
    errors.into_result()
}

/// Every step's rules against the whole draft
pub fn validate_all(draft: &OrderDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let steps = [
        StepFields::Customer(draft.customer()),
        StepFields::Products {
            lines: draft.lines(),
            catalog: draft.catalog(),
        },
        StepFields::Payment {
            delivery_charge: draft.delivery_charge(),
            attachment: draft.attachment(),
        },
    ];
    for fields in steps {
        if let Err(e) = fields.validate() {
            errors.merge(e);
        }
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Product;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            Product::new(1, "Oil", Decimal::from(2500)),
            Product::new(2, "Shampoo", Decimal::from(450)),
        ])
    }

    fn line(product_id: i64, quantity: u32, discount: Decimal) -> OrderLine {
        OrderLine {
            product_id,
            quantity,
            discount,
        }
    }

    #[test]
    fn test_customer_whitespace_is_empty() {
        let customer = CustomerInfo {
            full_name: "   ".into(),
            city: "Kathmandu".into(),
            delivery_address: "\t".into(),
            phone_number: " 9800000000 ".into(),
            ..Default::default()
        };
        let errors = validate_customer(&customer).unwrap_err();

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![
            Field::FullName,
            Field::DeliveryAddress
        ]);
    }

    #[test]
    fn test_phone_length_boundary() {
        let mut customer = CustomerInfo {
            full_name: "A".into(),
            city: "B".into(),
            delivery_address: "C".into(),
            phone_number: "980000000".into(),
            ..Default::default()
        };
        assert!(validate_customer(&customer).unwrap_err().contains(Field::PhoneNumber));

        customer.phone_number.push('1');
        assert!(validate_customer(&customer).is_ok());
    }

    #[test]
    fn test_all_zero_lines_rejected() {
        let lines = [line(1, 0, Decimal::ZERO), line(2, 0, Decimal::from(20))];
        let errors = validate_products(&lines, &catalog()).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::OrderProducts), Some(MSG_NO_PRODUCTS));
    }

    #[test]
    fn test_discount_equal_to_subtotal_allowed() {
        let lines = [line(1, 1, Decimal::from(2500)), line(2, 0, Decimal::ZERO)];
        assert!(validate_products(&lines, &catalog()).is_ok());

        let lines = [line(1, 1, Decimal::new(250001, 2)), line(2, 1, Decimal::ZERO)];
        let errors = validate_products(&lines, &catalog()).unwrap_err();
        assert_eq!(
            errors.get(Field::OrderProducts),
            Some(MSG_DISCOUNT_EXCEEDS_SUBTOTAL)
        );
    }

    #[test]
    fn test_payment_rules() {
        assert!(validate_payment(Decimal::ZERO, None).is_ok());
        assert!(validate_payment(Decimal::from(150), None).is_ok());
        assert!(
            validate_payment(Decimal::new(-1, 2), None)
                .unwrap_err()
                .contains(Field::DeliveryCharge)
        );
        assert!(validate_payment(pricing::MAX_AMOUNT, None).is_ok());
        let errors = validate_payment(Decimal::MAX, None).unwrap_err();
        assert_eq!(
            errors.get(Field::DeliveryCharge),
            Some("Delivery charge cannot exceed 1000000")
        );
    }

    #[test]
    fn test_step_fields_dispatch() {
        let catalog = catalog();
        let lines = [line(1, 0, Decimal::ZERO)];
        let fields = StepFields::Products {
            lines: &lines,
            catalog: &catalog,
        };
        assert!(fields.validate().is_err());

        let customer = CustomerInfo::default();
        let errors = StepFields::Customer(&customer).validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
