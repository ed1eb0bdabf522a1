//! Payload classification.
//!
//! Decides, from the shape of a [`SigningRequest`] alone, which operation
//! content goes through expense analysis and which presentations can be
//! offered. Field contents are never inspected, so there is no error path.

use crate::formats::{FormatKey, ViewFormat};
use crate::request::{RequestKind, SigningRequest};

/// What a request offers to the review, before any decoding happened.
#[derive(Debug)]
pub struct Classification<'a, Op> {
    kind: RequestKind,
    content: Option<&'a [Op]>,
    raw_bytes: Option<&'a [u8]>,
}

pub fn classify<Op>(request: &SigningRequest<Op>) -> Classification<'_, Op> {
    let (content, raw_bytes) = match request {
        SigningRequest::Connect {} => (None, None),
        SigningRequest::SignRaw { bytes, preview } => (preview.as_deref(), Some(bytes.as_slice())),
        SigningRequest::ConfirmOperations { operations } => (Some(operations.as_slice()), None),
    };

    Classification {
        kind: request.kind(),
        content,
        raw_bytes,
    }
}

impl<'a, Op> Classification<'a, Op> {
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Operation content eligible for expense analysis. `None` means the
    /// expense parser must not run at all.
    pub fn content(&self) -> Option<&'a [Op]> {
        self.content
    }

    pub fn raw_bytes(&self) -> Option<&'a [u8]> {
        self.raw_bytes
    }

    /// Candidate formats in display order. The decoded preview is only
    /// offered when the analysis found at least one expense.
    pub fn formats(&self, has_expenses: bool) -> Vec<ViewFormat> {
        let mut formats = Vec::with_capacity(3);

        if self.content.is_some() {
            if has_expenses {
                formats.push(FormatKey::Preview.format());
            }
            formats.push(FormatKey::Raw.format());
        }
        if self.raw_bytes.is_some() {
            formats.push(FormatKey::Bytes.format());
        }

        formats
    }
}
