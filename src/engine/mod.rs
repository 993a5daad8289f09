//! Order placement and inventory consistency.

pub mod checkout;
pub mod order_factory;
pub mod pricing;
pub mod status_machine;
pub mod stock_ledger;
pub mod validator;

pub use checkout::OrderEngine;
pub use order_factory::OrderFactory;
pub use pricing::{PriceBreakdown, PricingPolicy};
pub use status_machine::{check_transition, parse_order_id, parse_status, OrderStatusMachine, TransitionError};
pub use stock_ledger::{StockError, StockLedger};
pub use validator::{CheckoutLine, CheckoutPayload, OrderValidator, RequestedLine, ValidatedOrder, ValidationError};
