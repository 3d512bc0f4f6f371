//! Checkout flow and order hand-off

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::cart::{Cart, CartLine};
use crate::domain::events::{CheckoutEvent, DomainEvent};
use crate::domain::value_objects::Customer;

pub const WHATSAPP_BASE: &str = "https://wa.me";

// Same set encodeURIComponent leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-').remove(b'_').remove(b'.').remove(b'!').remove(b'~')
    .remove(b'*').remove(b'\'').remove(b'(').remove(b')');

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutView { #[default] Catalog, Summary, PaymentMethod }

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod { Whatsapp, Wompi }

/// Per-session checkout state machine.
///
/// `Catalog -> Summary -> PaymentMethod -> hand-off`. Going back always lands on
/// `Catalog` and keeps both the cart and the customer details for a retry.
#[derive(Clone, Debug, Default)]
pub struct Checkout {
    view: CheckoutView,
    customer: Option<Customer>,
    events: Vec<DomainEvent>,
}

impl Checkout {
    pub fn new() -> Self { Self::default() }
    pub fn view(&self) -> CheckoutView { self.view }
    pub fn customer(&self) -> Option<&Customer> { self.customer.as_ref() }

    pub fn open_summary(&mut self, cart: &Cart) -> Result<String, CheckoutError> {
        if cart.is_empty() { return Err(CheckoutError::EmptyCart); }
        self.view = CheckoutView::Summary;
        self.raise_event(DomainEvent::Checkout(CheckoutEvent::SummaryOpened { total: cart.compute_total() }));
        Ok(cart.summary_line())
    }

    pub fn confirm_customer(&mut self, cart: &Cart, customer: &Customer) -> Result<(), CheckoutError> {
        self.expect_view(CheckoutView::Summary)?;
        if cart.is_empty() { return Err(CheckoutError::EmptyCart); }
        let customer = validated(customer)?;
        self.customer = Some(customer);
        self.view = CheckoutView::PaymentMethod;
        self.raise_event(DomainEvent::Checkout(CheckoutEvent::CustomerConfirmed));
        Ok(())
    }

    /// Builds the outbound link for the chosen method. The view is left as is so
    /// the customer can retry the hand-off.
    pub fn hand_off(&mut self, cart: &Cart, method: PaymentMethod, phone: &str) -> Result<String, CheckoutError> {
        self.expect_view(CheckoutView::PaymentMethod)?;
        if method != PaymentMethod::Whatsapp { return Err(CheckoutError::UnsupportedPaymentMethod(method)); }
        let customer = self.customer.clone().ok_or(CheckoutError::InvalidTransition { from: self.view })?;
        let message = build_order_summary(cart, &customer)?;
        let link = whatsapp_link(phone, &message);
        self.raise_event(DomainEvent::Checkout(CheckoutEvent::OrderHandedOff {
            customer: customer.nombre.clone(),
            lines: cart.lines().len(),
            total: cart.compute_total(),
            link: link.clone(),
        }));
        Ok(link)
    }

    pub fn back(&mut self) {
        self.view = CheckoutView::Catalog;
        self.raise_event(DomainEvent::Checkout(CheckoutEvent::ReturnedToCatalog));
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: DomainEvent) { self.events.push(e); }

    fn expect_view(&self, expected: CheckoutView) -> Result<(), CheckoutError> {
        if self.view == expected { Ok(()) } else { Err(CheckoutError::InvalidTransition { from: self.view }) }
    }
}

fn validated(customer: &Customer) -> Result<Customer, CheckoutError> {
    let customer = customer.trimmed();
    customer.validate().map_err(|e| {
        let mut fields: Vec<String> = e.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        CheckoutError::IncompleteCustomer(fields)
    })?;
    Ok(customer)
}

pub(crate) fn describe_line(line: &CartLine) -> String {
    format!("{}× {} (Tamaño {})", line.quantity, line.nombre, line.size)
}

/// Multi-line order text sent through the messaging hand-off.
pub fn build_order_summary(cart: &Cart, customer: &Customer) -> Result<String, CheckoutError> {
    if cart.is_empty() { return Err(CheckoutError::EmptyCart); }
    let c = validated(customer)?;
    let lines: Vec<String> = cart.lines().iter().map(|l| format!("• {}", describe_line(l))).collect();
    Ok(format!(
        "🧾 *Pedido de {}*\n📞 {}\n📍 {}, {}\n\n{}\n\n💰 Total: {}\nGracias por tu compra 😊",
        c.nombre, c.telefono, c.direccion, c.barrio, lines.join("\n"), cart.compute_total()
    ))
}

pub fn whatsapp_link(phone: &str, message: &str) -> String {
    format!("{}/{}?text={}", WHATSAPP_BASE, phone, utf8_percent_encode(message, URI_COMPONENT))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    EmptyCart,
    IncompleteCustomer(Vec<String>),
    InvalidTransition { from: CheckoutView },
    UnsupportedPaymentMethod(PaymentMethod),
}
impl std::error::Error for CheckoutError {}
impl std::fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCart => write!(f, "Tu carrito está vacío"),
            Self::IncompleteCustomer(fields) => write!(f, "Completa todos los campos: {}", fields.join(", ")),
            Self::InvalidTransition { from } => write!(f, "Paso no disponible desde {from:?}"),
            Self::UnsupportedPaymentMethod(m) => write!(f, "Método de pago {m:?} no disponible"),
        }
    }
}
