//! Pre-signature expense analysis for Tezos signing requests.
//!
//! [`review_request`] classifies a request, decodes the debits its operations
//! make from the reviewing account, and derives the formats a wallet can show.
//! Token transfers are recognized against a closed whitelist of parameter
//! shapes (see [`shapes`]); everything else is reported without expenses.

pub mod address;
pub mod expenses;
pub mod michelson;
pub mod operation;
pub mod payload;
pub mod registry;
pub mod review;
pub mod shapes;

pub use address::{Address, AddressError, AddressKind};
pub use expenses::{AssetExpense, ExpenseAsset, ExpenseParser, ExpenseRecord, expense_count};
pub use michelson::{ParameterLimits, ParameterTree};
pub use operation::{OperationContent, OperationKind};
pub use payload::RawPayloadKind;
pub use registry::{
    AssetKind, AssetRegistry, AssetRegistryLookup, EmptyRegistry, RegistryError, ResolvedAsset,
};
pub use review::{
    DecodeFault, OperationReview, ReviewOptions, ReviewView, TezosSigningRequest, review_request,
};
pub use shapes::ParameterShapeMatcher;
