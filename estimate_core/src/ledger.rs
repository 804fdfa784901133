//! # Audit Ledger
//!
//! Every calculation stage appends line items describing what it computed.
//! The ledger is pure data: a presentation layer renders it as a three-column
//! table (label, formula/detail, value) with headings and notes spanning the
//! row.
//!
//! The ledger is append-only. It is built fresh for each estimate and
//! returned inside the [`EstimateResult`](crate::calculations::EstimateResult).
//!
//! ## JSON Example
//!
//! ```json
//! [
//!   { "kind": "heading", "text": "Step 2: Base Hours" },
//!   {
//!     "kind": "row",
//!     "label": "Fixed setup",
//!     "detail": "",
//!     "value": { "unit": "hours", "amount": 4.0 },
//!     "emphasized": false
//!   }
//! ]
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::{format_money, format_num};

/// Computed value column of a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "snake_case")]
pub enum LedgerValue {
    /// Squares, shown as `3 sq`
    Squares(f64),
    /// Hours, shown as `9 hrs`
    Hours(f64),
    /// A plain count, shown as-is
    Count(u32),
    /// An intermediate number without unit (weighted sums)
    Number(f64),
    /// A scaling factor, shown as `×1.2`
    Multiplier(f64),
    /// Billing rate, shown as `$150 /hr`
    Rate(f64),
    /// Money, shown as `$1,500.00`
    Money(f64),
}

impl fmt::Display for LedgerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LedgerValue::Squares(v) => write!(f, "{} sq", format_num(v)),
            LedgerValue::Hours(v) => write!(f, "{} hrs", format_num(v)),
            LedgerValue::Count(c) => write!(f, "{}", c),
            LedgerValue::Number(v) => write!(f, "{}", format_num(v)),
            LedgerValue::Multiplier(v) => write!(f, "×{}", format_num(v)),
            LedgerValue::Rate(v) => write!(f, "${} /hr", format_num(v)),
            LedgerValue::Money(v) => write!(f, "${}", format_money(v)),
        }
    }
}

/// One element of the audit ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineItem {
    /// Section heading (one per calculation stage)
    Heading { text: String },
    /// Explanatory note spanning the table
    Note { text: String },
    /// A labeled computation: label, formula text and computed value
    Row {
        label: String,
        detail: String,
        value: LedgerValue,
        emphasized: bool,
    },
}

impl LineItem {
    /// Label of a row, `None` for headings and notes
    pub fn label(&self) -> Option<&str> {
        match self {
            LineItem::Row { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Value of a row, `None` for headings and notes
    pub fn value(&self) -> Option<LedgerValue> {
        match self {
            LineItem::Row { value, .. } => Some(*value),
            _ => None,
        }
    }
}

/// Ordered, append-only sequence of line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    items: Vec<LineItem>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Ledger { items: Vec::new() }
    }

    /// Append a section heading
    pub fn heading(&mut self, text: impl Into<String>) {
        self.items.push(LineItem::Heading { text: text.into() });
    }

    /// Append a note
    pub fn note(&mut self, text: impl Into<String>) {
        self.items.push(LineItem::Note { text: text.into() });
    }

    /// Append a regular row
    pub fn row(&mut self, label: impl Into<String>, detail: impl Into<String>, value: LedgerValue) {
        self.push_row(label.into(), detail.into(), value, false);
    }

    /// Append an emphasized (bold) row, used for stage totals
    pub fn total(&mut self, label: impl Into<String>, detail: impl Into<String>, value: LedgerValue) {
        self.push_row(label.into(), detail.into(), value, true);
    }

    fn push_row(&mut self, label: String, detail: String, value: LedgerValue, emphasized: bool) {
        self.items.push(LineItem::Row {
            label,
            detail,
            value,
            emphasized,
        });
    }

    /// All line items in insertion order
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over line items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &LineItem> {
        self.items.iter()
    }

    /// Number of line items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First row with the given label
    pub fn find_row(&self, label: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.label() == Some(label))
    }

    /// All notes, in order
    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            LineItem::Note { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
