use rust_decimal::prelude::*;
use serde::Serialize;

use crate::database::models::Ticket;

const RUPIAH_SYMBOL: &str = "Rp";
const NBSP: char = '\u{a0}';

/// Format a price in the id-ID Rupiah convention, e.g. `50000.0` -> `Rp 50.000,00`
/// (with a non-breaking space after the symbol).
pub fn format_currency(value: f64) -> String {
    let amount = Decimal::from_f64_retain(value)
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    let digits = format!("{:.2}", amount.abs());
    let (integer, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    format!(
        "{}{}{}{},{}",
        sign,
        RUPIAH_SYMBOL,
        NBSP,
        group_thousands(integer),
        fraction
    )
}

fn group_thousands(integer: &str) -> String {
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

/// Wire format of a ticket: the stored fields plus a display price
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub price_formatted: String,
}

impl From<Ticket> for TicketView {
    fn from(ticket: Ticket) -> Self {
        let price_formatted = format_currency(ticket.price);
        Self {
            ticket,
            price_formatted,
        }
    }
}

pub fn ticket_views(tickets: Vec<Ticket>) -> Vec<TicketView> {
    tickets.into_iter().map(TicketView::from).collect()
}
