use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::holdings_service::build_holding;
use crate::compliance::{AssetClassification, ImpairmentEvent};
use crate::lots::Lot;

fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

fn lot(
    id: &str,
    acquired: DateTime<Utc>,
    quantity: Decimal,
    cost_per_unit: Decimal,
    classification: AssetClassification,
) -> Lot {
    Lot::new(
        id,
        "BTC",
        acquired,
        quantity,
        cost_per_unit,
        cost_per_unit * quantity,
        classification,
    )
}

#[test]
fn aggregates_quantities_and_fair_value() {
    let lots = vec![
        lot("lot-1", date(2025, 1, 1), dec!(10), dec!(100), AssetClassification::Investment),
        lot("lot-2", date(2025, 2, 1), dec!(5), dec!(150), AssetClassification::Investment),
    ];

    let holding =
        build_holding("BTC", Some("Bitcoin"), &lots, dec!(200), "USD", date(2025, 6, 1)).unwrap();

    assert_eq!(holding.asset_symbol, "BTC");
    assert_eq!(holding.asset_name.as_deref(), Some("Bitcoin"));
    assert_eq!(holding.total_quantity, dec!(15));
    assert_eq!(holding.current_fair_value, dec!(3000));
    assert_eq!(holding.fair_value_currency, "USD");
    assert_eq!(holding.lots.len(), 2);
}

#[test]
fn cost_basis_differs_by_method() {
    // Allocating the full 20 under any ordering consumes every lot, so the
    // automatic methods agree; the weighted average is the same total.
    let lots = vec![
        lot("lot-1", date(2025, 1, 1), dec!(10), dec!(100), AssetClassification::Investment),
        lot("lot-2", date(2025, 2, 1), dec!(10), dec!(150), AssetClassification::Investment),
    ];

    let holding =
        build_holding("BTC", None, &lots, dec!(200), "USD", date(2025, 6, 1)).unwrap();

    assert_eq!(holding.total_quantity, dec!(20));
    assert_eq!(holding.cost_basis.fifo, dec!(2500));
    assert_eq!(holding.cost_basis.lifo, dec!(2500));
    assert_eq!(holding.cost_basis.hifo, dec!(2500));
    assert_eq!(holding.cost_basis.weighted_average, dec!(2500));

    assert_eq!(holding.unrealized_gain_loss.fifo, dec!(1500));
    assert_eq!(holding.unrealized_gain_loss.weighted_average, dec!(1500));
}

#[test]
fn partially_consumed_lots_split_the_methods() {
    let mut lots = vec![
        lot("lot-1", date(2025, 1, 1), dec!(10), dec!(100), AssetClassification::Investment),
        lot("lot-2", date(2025, 2, 1), dec!(6), dec!(150), AssetClassification::Investment),
    ];
    lots[0].remaining_quantity = dec!(2);

    let holding =
        build_holding("BTC", None, &lots, dec!(200), "USD", date(2025, 6, 1)).unwrap();

    // 8 remain: 2 @ 100 plus 6 @ 150 in every ordering; the weighted
    // average cost is 137.50.
    assert_eq!(holding.total_quantity, dec!(8));
    assert_eq!(holding.cost_basis.fifo, dec!(1100));
    assert_eq!(holding.cost_basis.lifo, dec!(1100));
    assert_eq!(holding.cost_basis.weighted_average, dec!(1100));
}

#[test]
fn weighted_average_cost_basis_is_exact() {
    // 1 @ 1 plus 2 @ 2: the per-unit average 5/3 is non-terminating, but the
    // total cost basis is exactly 5 and must not pick up division rounding.
    let lots = vec![
        lot("lot-1", date(2025, 1, 1), dec!(1), dec!(1), AssetClassification::Investment),
        lot("lot-2", date(2025, 2, 1), dec!(2), dec!(2), AssetClassification::Investment),
    ];

    let holding =
        build_holding("BTC", None, &lots, dec!(2), "USD", date(2025, 6, 1)).unwrap();

    assert_eq!(holding.cost_basis.weighted_average, dec!(5));
    assert_eq!(holding.cost_basis.weighted_average, holding.cost_basis.fifo);
    // fair value 6 against cost 5, exactly.
    assert_eq!(holding.unrealized_gain_loss.weighted_average, dec!(1));
}

#[test]
fn empty_pool_yields_a_zero_holding() {
    let holding =
        build_holding("BTC", None, &[], dec!(200), "USD", date(2025, 6, 1)).unwrap();

    assert_eq!(holding.total_quantity, Decimal::ZERO);
    assert_eq!(holding.current_fair_value, Decimal::ZERO);
    assert_eq!(holding.cost_basis.fifo, Decimal::ZERO);
    assert_eq!(holding.cost_basis.weighted_average, Decimal::ZERO);
    assert!(holding.classification_breakdown.is_empty());
}

#[test]
fn classification_breakdown_counts_remaining_quantity() {
    let mut lots = vec![
        lot("lot-1", date(2025, 1, 1), dec!(6), dec!(100), AssetClassification::Investment),
        lot("lot-2", date(2025, 2, 1), dec!(4), dec!(100), AssetClassification::Operational),
        lot("lot-3", date(2025, 3, 1), dec!(3), dec!(100), AssetClassification::Investment),
    ];
    lots[2].remaining_quantity = Decimal::ZERO;

    let holding =
        build_holding("BTC", None, &lots, dec!(100), "USD", date(2025, 6, 1)).unwrap();

    assert_eq!(
        holding.classification_breakdown[&AssetClassification::Investment],
        dec!(6)
    );
    assert_eq!(
        holding.classification_breakdown[&AssetClassification::Operational],
        dec!(4)
    );
}

#[test]
fn impairment_totals_roll_up_from_lots() {
    let mut lots = vec![
        lot("lot-1", date(2025, 1, 1), dec!(10), dec!(100), AssetClassification::Investment),
        lot("lot-2", date(2025, 2, 1), dec!(5), dec!(150), AssetClassification::Investment),
    ];
    let event = ImpairmentEvent {
        event_id: "evt-1".to_string(),
        date: date(2025, 4, 1),
        impairment_amount: dec!(100),
        fair_value_at_event: dec!(900),
        carrying_amount_before: dec!(1000),
        carrying_amount_after: dec!(900),
        reason: "Fair value below carrying amount".to_string(),
        reversal_allowed: false,
    };
    lots[0].record_impairment(event.clone());
    lots[1].record_impairment(ImpairmentEvent {
        event_id: "evt-2".to_string(),
        impairment_amount: dec!(50),
        ..event
    });

    let holding =
        build_holding("BTC", None, &lots, dec!(100), "USD", date(2025, 6, 1)).unwrap();

    assert_eq!(holding.total_impairment, dec!(150));
    assert_eq!(holding.impairment_events, 2);
}
