//! Merges the redeem and query responses into one canonical card record.
//!
//! Query reports the current state of a key and is treated as authoritative;
//! redeem only reports the immediate outcome and is consulted when query has
//! no usable card. Reconciliation is a pure function of the two responses and
//! the request start time.

pub mod fields;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Number, Value};

use crate::messages;
use crate::upstream::{Endpoint, UpstreamResponse};

/// Canonical card record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    /// `MM/YY` as sent, or `MM/<year>` derived from month/year fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_minutes: Option<Number>,
    /// When the issued card stops being usable, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<String>,
    /// Redemption time reported by the upstream, verbatim; sent as `activatedAt`
    #[serde(skip)]
    pub redeemed_at: Option<String>,
}

impl CardRecord {
    /// Resolve every card field from one upstream payload.
    pub fn resolve(body: &Value) -> Self {
        let candidates = fields::candidates(body);

        let expiry = fields::resolve_string(&candidates, fields::EXPIRY).or_else(|| {
            let month = fields::resolve_date_part(&candidates, fields::EXPIRY_MONTH)?;
            let year = fields::resolve_date_part(&candidates, fields::EXPIRY_YEAR)?;
            Some(format!("{:0>2}/{}", month, year))
        });

        Self {
            card_number: fields::resolve_string(&candidates, fields::CARD_NUMBER),
            cvv: fields::resolve_string(&candidates, fields::CVV),
            expiry,
            valid_minutes: fields::resolve(&candidates, fields::VALID_MINUTES)
                .and_then(fields::coerce_number),
            expire_time: fields::resolve_string(&candidates, fields::EXPIRE_TIME),
            redeemed_at: redeemed_at(body),
        }
    }

    /// A record counts only if it carries a card number or CVV.
    pub fn is_present(&self) -> bool {
        self.card_number.is_some() || self.cvv.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub success: bool,
    pub card: Option<CardRecord>,
    pub activated_at: String,
    pub error: Option<String>,
    /// Which response the card came from
    #[serde(skip)]
    pub source: Option<Endpoint>,
}

fn redeemed_at(body: &Value) -> Option<String> {
    fields::resolve_string(&fields::candidates(body), fields::REDEEMED_AT)
}

fn has_success_flag(body: &Value) -> bool {
    fields::resolve(&fields::candidates(body), fields::SUCCESS).is_some_and(fields::is_truthy)
}

fn message(body: &Value) -> Option<String> {
    fields::resolve_text(&fields::candidates(body), fields::MESSAGE)
}

/// Format a timestamp the way browsers print `Date.toISOString()`.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn reconcile(
    redeem: &UpstreamResponse,
    query: &UpstreamResponse,
    started_at: DateTime<Utc>,
) -> ReconciliationResult {
    let (q, r) = (&query.data, &redeem.data);

    // (source, its payload, the other payload), in preference order
    let preference = [(Endpoint::Query, q, r), (Endpoint::Redeem, r, q)];

    let picked = preference.iter().find_map(|&(endpoint, own, other)| {
        let card = CardRecord::resolve(own);
        card.is_present().then_some((endpoint, card, other))
    });

    let (source, card, other) = match picked {
        Some((endpoint, card, other)) => (Some(endpoint), Some(card), other),
        None => (None, None, r),
    };

    let own_time = match &card {
        Some(card) => card.redeemed_at.clone(),
        None => redeemed_at(q),
    };
    let activated_at = own_time
        .or_else(|| redeemed_at(other))
        .unwrap_or_else(|| iso_timestamp(started_at));

    let success = (has_success_flag(q) || has_success_flag(r)) && card.is_some();

    let error = if success {
        None
    } else {
        // Timeout/transport text is for logs, not for the user
        Some(
            [query, redeem]
                .into_iter()
                .filter(|response| !response.is_transport_failure())
                .find_map(|response| message(&response.data))
                .unwrap_or_else(|| messages::GENERIC_FAILURE.to_string()),
        )
    };

    ReconciliationResult {
        success,
        card,
        activated_at,
        error,
        source,
    }
}
