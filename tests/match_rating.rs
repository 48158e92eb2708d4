use footy_model::action_value::{Action, MistakeType};
use footy_model::match_metrics::aggregate;
use footy_model::match_rating::{MatchRatingInputs, Modifiers, compute_mpr, mpr_breakdown};
use footy_model::role_weights::RoleWeightTable;

fn logged_match_inputs() -> MatchRatingInputs {
    let metrics = aggregate(&[
        Action::new(7.0, 8.0, 5.0, 6.0, 4.0, MistakeType::None),
        Action::new(9.0, 9.0, 8.0, 9.0, 7.0, MistakeType::None),
        Action::new(4.0, 5.0, 6.0, 5.0, 6.0, MistakeType::Decision),
    ]);
    let mut inputs = MatchRatingInputs::from_metrics(&metrics, 50.0, 10.0);
    inputs.ec_pct = 75.0;
    inputs
}

#[test]
fn central_midfielder_rating_for_logged_match() {
    let weights = RoleWeightTable::standard().weights_for("CM / 8").unwrap();
    let mpr = compute_mpr(&logged_match_inputs(), &weights, &Modifiers::default());
    assert!((mpr - 56.875).abs() < 1e-9, "mpr was {mpr}");
}

#[test]
fn rounded_display_values_land_close() {
    let weights = RoleWeightTable::standard().weights_for("CM / 8").unwrap();
    let inputs = MatchRatingInputs {
        aqc: 6.2917,
        his_pct: 33.3,
        ec_pct: 75.0,
        tii: 50.0,
        ibi: 10.0,
    };
    let mpr = compute_mpr(&inputs, &weights, &Modifiers::default());
    assert!((mpr - 56.875).abs() < 0.01);
}

#[test]
fn stability_bonus_touches_only_consistency() {
    let weights = RoleWeightTable::standard().weights_for("CM / 8").unwrap();
    let inputs = logged_match_inputs();
    let base = mpr_breakdown(&inputs, &weights, &Modifiers::default());
    let bonus = mpr_breakdown(&inputs, &weights, &Modifiers::new(1.08, 1.0, None));

    assert_eq!(base.aqc, bonus.aqc);
    assert_eq!(base.his, bonus.his);
    assert_eq!(base.tii, bonus.tii);
    assert_eq!(base.ibi, bonus.ibi);
    // 0.30 * 75 * 0.08
    assert!((bonus.mpr - base.mpr - 1.8).abs() < 1e-9);
}

#[test]
fn modifiers_are_bounded() {
    let weights = RoleWeightTable::standard().weights_for("Winger").unwrap();
    let inputs = logged_match_inputs();

    let capped_sci = compute_mpr(&inputs, &weights, &Modifiers::new(1.5, 1.0, None));
    let max_sci = compute_mpr(&inputs, &weights, &Modifiers::new(1.08, 1.0, None));
    assert_eq!(capped_sci, max_sci);

    let low_sci = compute_mpr(&inputs, &weights, &Modifiers::new(0.9, 1.0, None));
    let neutral = compute_mpr(&inputs, &weights, &Modifiers::default());
    assert_eq!(low_sci, neutral);

    let m = Modifiers::new(1.0, 3.0, Some(0.1)).clamped();
    assert_eq!(m.om, 1.5);
    assert_eq!(m.pi, Some(0.5));
}

#[test]
fn outcome_and_presence_multiply_the_sum() {
    let weights = RoleWeightTable::standard().weights_for("AM / 10").unwrap();
    let inputs = logged_match_inputs();
    let base = compute_mpr(&inputs, &weights, &Modifiers::default());

    let with_om = compute_mpr(&inputs, &weights, &Modifiers::new(1.0, 1.2, None));
    assert!((with_om - base * 1.2).abs() < 1e-9);

    let with_pi = compute_mpr(&inputs, &weights, &Modifiers::new(1.0, 1.2, Some(1.1)));
    assert!((with_pi - base * 1.2 * 1.1).abs() < 1e-9);

    let explicit_neutral_pi = compute_mpr(&inputs, &weights, &Modifiers::new(1.0, 1.0, Some(1.0)));
    assert_eq!(explicit_neutral_pi, base);
}

#[test]
fn breakdown_components_add_up() {
    let weights = RoleWeightTable::standard().weights_for("CF / Striker").unwrap();
    let b = mpr_breakdown(&logged_match_inputs(), &weights, &Modifiers::new(1.04, 1.3, Some(0.9)));
    let total: f64 = b.components().iter().map(|(_, v)| v).sum();
    assert!((total - b.weighted_sum).abs() < 1e-9);
    assert!((b.mpr - b.weighted_sum * 1.3 * 0.9).abs() < 1e-9);
}

#[test]
fn holding_midfielder_ignores_brilliance() {
    let weights = RoleWeightTable::standard().weights_for("DM / 6").unwrap();
    let mut inputs = logged_match_inputs();
    let quiet = compute_mpr(&inputs, &weights, &Modifiers::default());
    inputs.ibi = 95.0;
    let flashy = compute_mpr(&inputs, &weights, &Modifiers::default());
    assert_eq!(quiet, flashy);
}
