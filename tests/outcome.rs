use footy_model::outcome::{MAX_OUTCOME, NEUTRAL_OUTCOME, StatRecord, resolve_outcome_multiplier};

#[test]
fn missing_stats_are_neutral() {
    assert_eq!(resolve_outcome_multiplier(None), 1.0);
}

#[test]
fn goals_and_assists_add_bonus() {
    let stats = StatRecord::new("Player", 7, 1, 1);
    assert!((resolve_outcome_multiplier(Some(&stats)) - 1.15).abs() < 1e-12);

    let blank = StatRecord::new("Player", 7, 0, 0);
    assert_eq!(resolve_outcome_multiplier(Some(&blank)), 1.0);
}

#[test]
fn multiplier_is_capped() {
    let hat_trick_plus = StatRecord::new("Player", 7, 4, 3);
    assert_eq!(resolve_outcome_multiplier(Some(&hat_trick_plus)), 1.5);
}

#[test]
fn multiplier_is_monotone_and_bounded() {
    for goals in 0..=12u32 {
        for assists in 0..=12u32 {
            let om = resolve_outcome_multiplier(Some(&StatRecord::new("P", 1, goals, assists)));
            let more_goals =
                resolve_outcome_multiplier(Some(&StatRecord::new("P", 1, goals + 1, assists)));
            let more_assists =
                resolve_outcome_multiplier(Some(&StatRecord::new("P", 1, goals, assists + 1)));
            assert!((NEUTRAL_OUTCOME..=MAX_OUTCOME).contains(&om));
            assert!(more_goals >= om);
            assert!(more_assists >= om);
        }
    }
}
