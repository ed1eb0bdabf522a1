//! The review of one signing request, from classification to the view the
//! user is looking at.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use signreview::{
    Classification, FormatKey, RequestKind, ReviewError, SigningRequest, ViewFormat,
    ViewFormatSelector, classify,
};
use thiserror::Error;
use tracing::{debug, error};

use crate::address::Address;
use crate::expenses::{ExpenseParser, ExpenseRecord, expense_count};
use crate::michelson::ParameterLimits;
use crate::operation::OperationContent;
use crate::payload::RawPayloadKind;
use crate::registry::AssetRegistryLookup;

pub type TezosSigningRequest = SigningRequest<OperationContent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOptions {
    /// Run expense analysis at all. Without it only raw views are offered.
    pub decode_expenses: bool,
    pub limits: ParameterLimits,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            decode_expenses: true,
            limits: ParameterLimits::default(),
        }
    }
}

/// A failure inside expense decoding, caught before it reached the review.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("expense decoding failed: {message}")]
pub struct DecodeFault {
    pub message: String,
}

/// Content handed to a renderer for one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewView<'a> {
    Preview(&'a [ExpenseRecord]),
    /// Operations exactly as the application sent them
    RawOperations(&'a [OperationContent]),
    RawBytes(&'a [u8]),
}

pub struct OperationReview<'a> {
    classification: Classification<'a, OperationContent>,
    /// `None` when the expense parser did not run
    expenses: Option<Vec<ExpenseRecord>>,
    fault: Option<DecodeFault>,
    selector: ViewFormatSelector,
}

/// Reviews `request` on behalf of `account`.
///
/// Never fails: a fault while decoding expenses is recorded on the review and
/// the raw formats stay available.
pub fn review_request<'a, L>(
    request: &'a TezosSigningRequest,
    account: &Address,
    lookup: &L,
    options: &ReviewOptions,
) -> OperationReview<'a>
where
    L: AssetRegistryLookup + ?Sized,
{
    let classification = classify(request);
    let mut fault = None;

    let expenses = match classification.content() {
        Some(operations) if options.decode_expenses => {
            let parsed = panic::catch_unwind(AssertUnwindSafe(|| {
                ExpenseParser::new(lookup, options.limits).parse(operations, account)
            }));
            match parsed {
                Ok(records) => Some(records),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!(%message, kind = %classification.kind(), "expense decoding panicked");
                    fault = Some(DecodeFault { message });
                    None
                }
            }
        }
        _ => None,
    };

    let has_expenses = expenses
        .as_deref()
        .is_some_and(|records| expense_count(records) > 0);
    let selector = ViewFormatSelector::new(classification.formats(has_expenses));
    debug!(
        kind = %classification.kind(),
        formats = selector.formats().len(),
        has_expenses,
        "request reviewed"
    );

    OperationReview {
        classification,
        expenses,
        fault,
        selector,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<'a> OperationReview<'a> {
    pub fn kind(&self) -> RequestKind {
        self.classification.kind()
    }

    /// One record per analyzed operation, or empty when nothing was analyzed.
    pub fn expenses(&self) -> &[ExpenseRecord] {
        self.expenses.as_deref().unwrap_or_default()
    }

    /// Whether the expense parser ran to completion.
    pub fn analyzed(&self) -> bool {
        self.expenses.is_some()
    }

    pub fn expense_count(&self) -> usize {
        expense_count(self.expenses())
    }

    pub fn fault(&self) -> Option<&DecodeFault> {
        self.fault.as_ref()
    }

    pub fn payload_kind(&self) -> Option<RawPayloadKind> {
        self.classification.raw_bytes().map(RawPayloadKind::detect)
    }

    pub fn formats(&self) -> &[ViewFormat] {
        self.selector.formats()
    }

    pub fn active_format(&self) -> Option<&ViewFormat> {
        self.selector.active()
    }

    pub fn select(&mut self, key: FormatKey) -> Result<&ViewFormat, ReviewError> {
        self.selector.select(key)
    }

    pub fn select_str(&mut self, key: &str) -> Result<&ViewFormat, ReviewError> {
        self.selector.select_str(key)
    }

    /// Content for `key`, when that format is offered.
    pub fn view(&self, key: FormatKey) -> Option<ReviewView<'_>> {
        if !self.selector.formats().iter().any(|format| format.key == key) {
            return None;
        }
        match key {
            FormatKey::Preview => self.expenses.as_deref().map(ReviewView::Preview),
            FormatKey::Raw => self.classification.content().map(ReviewView::RawOperations),
            FormatKey::Bytes => self.classification.raw_bytes().map(ReviewView::RawBytes),
        }
    }

    pub fn active_view(&self) -> Option<ReviewView<'_>> {
        self.view(self.selector.active_key()?)
    }
}
