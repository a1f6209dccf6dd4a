use crate::state::messages::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Re-derives the season phase from the clock once a minute. Phase changes
/// are never pushed, so this tick is how the UI notices them.
pub struct PhaseTicker {
    ui_events: mpsc::Sender<UiEvent>,
    period: Duration,
}

impl PhaseTicker {
    pub fn new(ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { ui_events, period: Duration::from_secs(60) }
    }

    pub async fn run(self) {
        let mut phase_interval = interval(self.period);
        // Skip the immediate first tick; AppStarted already evaluates the phase.
        phase_interval.tick().await;

        loop {
            phase_interval.tick().await;
            if self.ui_events.send(UiEvent::PhaseTick).await.is_err() {
                break;
            }
        }
    }
}
