use chrono::NaiveDate;
use pagecatch_core::{update, Effect, Msg, NoUpdateReason, RunState, SiteDescriptor, SiteOutcome};

fn init_logging() {
    pagecatch_logging::initialize_for_tests();
}

fn no_update(name: &str) -> SiteOutcome {
    SiteOutcome::NoUpdate {
        name: name.to_string(),
        reason: NoUpdateReason::Unchanged,
    }
}

#[test]
fn changed_identity_emits_record_effect() {
    init_logging();
    let site = SiteDescriptor::new("a", "https://a.example")
        .with_locator("main")
        .with_user_agent("X");
    let (state, effects) = update(
        RunState::new(),
        Msg::SiteProcessed {
            site,
            outcome: no_update("a"),
            used_user_agent: Some("Y".to_string()),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::RecordUserAgent {
            name: "a".to_string(),
            url: "https://a.example".to_string(),
            locator: Some("main".to_string()),
            user_agent: "Y".to_string(),
        }]
    );
    assert_eq!(state.outcomes().len(), 1);
}

#[test]
fn same_identity_emits_nothing() {
    let site = SiteDescriptor::new("a", "https://a.example").with_user_agent("X");
    let (_, effects) = update(
        RunState::new(),
        Msg::SiteProcessed {
            site,
            outcome: no_update("a"),
            used_user_agent: Some("X".to_string()),
        },
    );
    assert!(effects.is_empty());
}

#[test]
fn failed_fetch_does_not_record_identity() {
    let site = SiteDescriptor::new("a", "https://a.example");
    let (state, effects) = update(
        RunState::new(),
        Msg::SiteProcessed {
            site,
            outcome: SiteOutcome::Failed {
                name: "a".to_string(),
                url: "https://a.example".to_string(),
                message: "boom".to_string(),
            },
            used_user_agent: None,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.summary().failed, 1);
}

#[test]
fn run_finished_delivers_once() {
    let today = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    let (state, _) = update(
        RunState::new(),
        Msg::SiteProcessed {
            site: SiteDescriptor::new("a", "u"),
            outcome: no_update("a"),
            used_user_agent: None,
        },
    );
    let (state, effects) = update(state, Msg::RunFinished { today });
    assert!(state.is_finished());
    match effects.as_slice() {
        [Effect::DeliverReport(report)] => {
            assert_eq!(report.subject, "更新なし：差分報告（2024/05/06）");
        }
        other => panic!("unexpected effects: {other:?}"),
    }

    let (state, effects) = update(state, Msg::RunFinished { today });
    assert!(effects.is_empty());
    assert_eq!(state.summary().total(), 1);
}
