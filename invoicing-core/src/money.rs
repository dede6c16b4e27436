//! Monetary arithmetic for invoicing-core.
//!
//! Never use floating-point for money; everything here runs on
//! `rust_decimal::Decimal`. One rounding policy for the whole system:
//! half-up to 2 decimal places.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Scale of all stored monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Scale of stored quantities.
pub const QUANTITY_SCALE: u32 = 4;

fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Net total of a line: unit price times quantity, rounded half-up to
/// 2 decimals. Inputs are expected non-negative; callers validate upstream
/// and negative values pass through unchanged.
pub fn line_net_total(net_unit_price: Decimal, quantity: Decimal) -> Decimal {
    round_money(net_unit_price * quantity)
}

/// VAT amount for a line given its net total and the string-encoded rate.
///
/// A missing, blank, unparsable or negative rate yields zero VAT. This is
/// deliberate fail-open behavior for exemption codes like "zw." or "np.";
/// callers needing strict rate validation must validate before assembly.
pub fn vat_amount(net_total: Decimal, vat_rate: Option<&str>) -> Decimal {
    let Some(text) = vat_rate else {
        return Decimal::ZERO;
    };
    let text = text.trim();
    if text.is_empty() {
        return Decimal::ZERO;
    }
    match Decimal::from_str(text) {
        Ok(rate) if rate >= Decimal::ZERO => round_money(net_total * rate / Decimal::ONE_HUNDRED),
        _ => Decimal::ZERO,
    }
}

/// Gross total of a line. Both operands are already rounded to 2 decimals,
/// so the sum needs no further rounding.
pub fn gross_total(net_total: Decimal, vat: Decimal) -> Decimal {
    net_total + vat
}

/// Running document-level totals.
///
/// Sums already-rounded per-line values without a second rounding step, so
/// the document totals reconcile exactly against the line items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentTotals {
    pub net: Decimal,
    pub vat: Decimal,
    pub gross: Decimal,
}

impl DocumentTotals {
    pub fn add_line(&mut self, net: Decimal, vat: Decimal, gross: Decimal) {
        self.net += net;
        self.vat += vat;
        self.gross += gross;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn line_net_total_rounds_half_up() {
        // 100.00 * 2.005 = 200.50 exactly under half-up
        assert_eq!(line_net_total(dec!(100.00), dec!(2.005)), dec!(200.50));
        // midpoint boundary: 0.125 rounds to 0.13, not 0.12
        assert_eq!(line_net_total(dec!(0.25), dec!(0.5)), dec!(0.13));
        assert_eq!(line_net_total(dec!(3.335), dec!(1)), dec!(3.34));
    }

    #[test]
    fn line_net_total_plain_product() {
        assert_eq!(line_net_total(dec!(100.00), dec!(2)), dec!(200.00));
        assert_eq!(line_net_total(dec!(19.99), dec!(3)), dec!(59.97));
        assert_eq!(line_net_total(dec!(0), dec!(42)), dec!(0.00));
    }

    #[test]
    fn vat_amount_standard_rates() {
        assert_eq!(vat_amount(dec!(200.00), Some("23")), dec!(46.00));
        assert_eq!(vat_amount(dec!(50.00), Some("0")), dec!(0.00));
        assert_eq!(vat_amount(dec!(100.00), Some("8")), dec!(8.00));
        // rounding inside the VAT computation: 33.33 * 23% = 7.6659 -> 7.67
        assert_eq!(vat_amount(dec!(33.33), Some("23")), dec!(7.67));
    }

    #[test]
    fn vat_amount_fails_open_on_bad_rates() {
        assert_eq!(vat_amount(dec!(100.00), None), Decimal::ZERO);
        assert_eq!(vat_amount(dec!(100.00), Some("")), Decimal::ZERO);
        assert_eq!(vat_amount(dec!(100.00), Some("   ")), Decimal::ZERO);
        assert_eq!(vat_amount(dec!(100.00), Some("zw.")), Decimal::ZERO);
        assert_eq!(vat_amount(dec!(100.00), Some("not-a-number")), Decimal::ZERO);
        assert_eq!(vat_amount(dec!(100.00), Some("-5")), Decimal::ZERO);
    }

    #[test]
    fn gross_total_is_plain_sum() {
        assert_eq!(gross_total(dec!(200.50), dec!(46.12)), dec!(246.62));
    }

    #[test]
    fn document_totals_sum_rounded_lines_exactly() {
        let mut totals = DocumentTotals::default();
        for _ in 0..3 {
            let net = line_net_total(dec!(33.33), dec!(1));
            let vat = vat_amount(net, Some("23"));
            totals.add_line(net, vat, gross_total(net, vat));
        }
        // 3 * 33.33 and 3 * 7.67; no re-rounding of the aggregate
        assert_eq!(totals.net, dec!(99.99));
        assert_eq!(totals.vat, dec!(23.01));
        assert_eq!(totals.gross, dec!(123.00));
        assert_eq!(totals.gross, totals.net + totals.vat);
    }
}
