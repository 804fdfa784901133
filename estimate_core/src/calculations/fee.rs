//! # Fee
//!
//! Hours times the billing rate, for both the exact and the rounded hour
//! totals. The rounded fee is the quoted figure.

use serde::{Deserialize, Serialize};

use super::totals::TotalsResult;
use crate::format::format_num;
use crate::ledger::{Ledger, LedgerValue};
use crate::units::{Dollars, DollarsPerHour};

/// Exact and quoted fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeResult {
    pub rate: DollarsPerHour,
    pub exact: Dollars,
    /// Canonical quoted fee
    pub rounded: Dollars,
}

/// Price the hour totals at `rate`.
pub fn calculate(totals: &TotalsResult, rate: DollarsPerHour, ledger: &mut Ledger) -> FeeResult {
    ledger.heading("Fee Estimate");
    ledger.row("Rate", "", LedgerValue::Rate(rate.0));

    let exact = totals.exact * rate;
    ledger.row(
        "Fee (exact hours)",
        format!("{} hrs × ${}", format_num(totals.exact.0), format_num(rate.0)),
        LedgerValue::Money(exact.0),
    );

    let rounded = totals.rounded * rate;
    ledger.total(
        "Fee (rounded hours)",
        format!("{} hrs × ${}", format_num(totals.rounded.0), format_num(rate.0)),
        LedgerValue::Money(rounded.0),
    );

    FeeResult {
        rate,
        exact,
        rounded,
    }
}
