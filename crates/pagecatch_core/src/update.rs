use crate::{build_report, Effect, Msg, RunState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    if state.is_finished() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::SiteProcessed {
            site,
            outcome,
            used_user_agent,
        } => {
            let mut effects = Vec::new();
            if let Some(used) = used_user_agent {
                let configured = site.user_agent.as_deref().unwrap_or("");
                if used != configured {
                    effects.push(Effect::RecordUserAgent {
                        name: site.name,
                        url: site.url,
                        locator: site.locator,
                        user_agent: used,
                    });
                }
            }
            state.push_outcome(outcome);
            effects
        }
        Msg::RunFinished { today } => {
            let report = build_report(state.outcomes(), today);
            state.finish();
            vec![Effect::DeliverReport(report)]
        }
    };

    (state, effects)
}
