//! Order Desk - sales order engine
//!
//! Builds multi-product orders against a catalog snapshot, validates and
//! prices them, submits them through [`sales_client`], and keeps the order
//! list in step with the backend by refetching after every mutation.
//!
//! # Layout
//!
//! ```text
//! catalog     - product snapshot loaded per order-creation session
//! draft       - in-progress order, step machine, payment attachment
//! validator   - per-step and whole-draft rules
//! pricing     - line and draft totals (decimal, 2 dp)
//! submission  - draft -> payload -> create, one in flight per draft
//! reconciler  - order list cache, status changes, deletes
//! stats       - order list aggregates
//! route       - navigation targets and login redirects
//! console     - operator commands run by the binary
//! ```

pub mod catalog;
pub mod config;
pub mod console;
pub mod draft;
pub mod error;
pub mod logger;
pub mod pricing;
pub mod reconciler;
pub mod route;
pub mod stats;
pub mod submission;
pub mod validator;

pub use catalog::CatalogSnapshot;
pub use config::DeskConfig;
pub use draft::{CustomerInfo, OrderDraft, OrderLine, PaymentAttachment, Step};
pub use error::{
    CatalogError, DeskError, DeskResult, DraftError, ReconcileError, SubmitError, ValidationErrors,
};
pub use pricing::{DraftTotals, LineBreakdown};
pub use reconciler::OrderListReconciler;
pub use route::Route;
pub use stats::OrderStats;
pub use submission::{build_payload, submit};
pub use validator::{Field, StepFields, validate_all};
