use desk_domain::services::format::{format_inr_fixed, format_inr_grouped, Tone};
use desk_domain::services::view::{build_holdings_body, TableBody};
use desk_domain::value_objects::agent_status::AgentStatus;
use desk_domain::value_objects::snapshot::Holding;
use proptest::prelude::*;

fn status_strategy() -> impl Strategy<Value = AgentStatus> {
    prop_oneof![
        Just(AgentStatus::Running),
        Just(AgentStatus::Paused),
        Just(AgentStatus::Stopped),
        Just(AgentStatus::Unknown),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn button_rule_holds_for_every_status(status in status_strategy()) {
        let controls = status.controls();
        prop_assert_eq!(!controls.start, status == AgentStatus::Running);
        prop_assert_eq!(!controls.pause, status != AgentStatus::Running);
        prop_assert_eq!(!controls.stop, status == AgentStatus::Stopped);
    }

    #[test]
    fn currency_always_has_two_fraction_digits(amount in -1.0e12f64..1.0e12) {
        for text in [format_inr_grouped(amount), format_inr_fixed(amount)] {
            prop_assert!(text.starts_with('₹'));
            let (_, frac) = text.rsplit_once('.').expect("decimal point");
            prop_assert_eq!(frac.len(), 2);
            prop_assert!(frac.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn grouping_only_changes_separators(amount in 0.0f64..1.0e12) {
        let grouped = format_inr_grouped(amount).replace(',', "");
        prop_assert_eq!(grouped, format_inr_fixed(amount));
    }

    #[test]
    fn tone_matches_sign(amount in -1.0e9f64..1.0e9) {
        let expected = if amount >= 0.0 { Tone::Positive } else { Tone::Negative };
        prop_assert_eq!(Tone::of(amount), expected);
    }

    #[test]
    fn holdings_render_one_row_each(count in 1usize..20, pl in -1000.0f64..1000.0) {
        let holdings: Vec<Holding> = (0..count)
            .map(|i| Holding {
                symbol: format!("SYM{i}"),
                quantity: i as i64 + 1,
                avg_price: 100.0,
                current_price: 100.0,
                value: 100.0,
                pl,
            })
            .collect();
        let body = build_holdings_body(&holdings);
        prop_assert_eq!(body.row_count(), count);
        if let TableBody::Rows { rows } = body {
            for row in rows {
                prop_assert_eq!(row.cells.len(), 6);
                prop_assert_eq!(row.cells[5].tone, Some(Tone::of(pl)));
            }
        } else {
            prop_assert!(false, "expected rows");
        }
    }
}
