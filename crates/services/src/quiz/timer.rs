use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::controller::QuizEvent;

const TICK: Duration = Duration::from_secs(1);

/// One-second countdown feeding `QuizEvent::Tick` into the controller.
///
/// Owning the handle owns the timer: dropping it aborts the task, so at most
/// one countdown per controller can be live.
#[derive(Debug)]
pub struct CountdownTimer {
    token: u64,
    task: JoinHandle<()>,
}

impl CountdownTimer {
    /// Spawn a countdown whose ticks carry `token`. Must be called from
    /// within a tokio runtime.
    #[must_use]
    pub fn start(token: u64, events: UnboundedSender<QuizEvent>) -> Self {
        let task = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK, TICK);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if events.send(QuizEvent::Tick { token }).is_err() {
                    break;
                }
            }
        });
        Self { token, task }
    }

    #[must_use]
    pub fn token(&self) -> u64 {
        self.token
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_until_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = CountdownTimer::start(7, tx);

        for _ in 0..3 {
            let event = rx.recv().await.unwrap();
            assert!(matches!(event, QuizEvent::Tick { token: 7 }));
        }

        drop(timer);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }
}
