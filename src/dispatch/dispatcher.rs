use std::time::{Duration, Instant};

use serde::{Serialize, Deserialize};
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, trace};

use crate::core::{
    Announcement, Error, IntervalDirective, MergeOrder, Result, DEFAULT_TICK_MS, STALE_WINDOW_MS,
};
use crate::notation;
use crate::schedule::Schedule;
use crate::time::codec;
use super::lead::LeadTable;

/// Configuration for the tick dispatcher
///
/// Supplied explicitly at construction; [`DispatcherConfig::default`] is the
/// documented fallback when the host has nothing to say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Announcement notation compiled into the schedule
    pub notation: String,
    /// Countdown duration text ("SS", "MM:SS", or "HH:MM:SS")
    pub duration: String,
    /// Tick cadence
    #[serde(serialize_with = "crate::core::serde::serialize_duration")]
    #[serde(deserialize_with = "crate::core::serde::deserialize_duration")]
    pub tick_interval: Duration,
    /// Directive expansion priority when offsets collide
    pub merge_order: MergeOrder,
    /// Speech lead estimation bands
    pub lead_table: LeadTable,
    /// Spoken when the countdown reaches zero
    pub end_text: String,
    /// Delay between the end text and the chime
    #[serde(serialize_with = "crate::core::serde::serialize_duration")]
    #[serde(deserialize_with = "crate::core::serde::deserialize_duration")]
    pub chime_delay: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            notation: "1/2".to_string(),
            duration: "60".to_string(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            merge_order: MergeOrder::default(),
            lead_table: LeadTable::default(),
            end_text: "time is up".to_string(),
            chime_delay: Duration::from_secs(1),
        }
    }
}

/// Events emitted to the external speech/display collaborator
///
/// Each announcement is delivered at most once; the core makes no assumption
/// about how the collaborator renders or speaks it.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    /// Clock and progress update for display
    Display {
        /// Remaining time on the countdown clock
        remaining_ms: u64,
        /// Fraction of the countdown elapsed, 0.0..=1.0
        progress: f64,
    },
    /// A message due to be spoken now
    Announce {
        /// The human phrase
        message: String,
    },
    /// Countdown reached zero
    Finished,
    /// End-of-countdown chime, sequenced after the end text
    Chime,
}

/// Dispatcher lifecycle states
#[derive(Debug, Clone)]
enum DispatchState {
    /// Configured but not started
    Idle,
    /// Counting down against an absolute end anchor
    Running {
        /// Instant the countdown reaches zero; remaining time is re-derived
        /// from it every tick so the clock cannot drift
        end_time: Instant,
    },
    /// Dispatch clock frozen
    Paused {
        /// Remaining time captured at the pause instant
        remaining_ms: u64,
    },
    /// Countdown completed; end actions flushed
    Finished,
}

/// Snapshot of the dispatcher's current state
#[derive(Debug, Clone, PartialEq)]
pub struct DispatcherInfo {
    /// Current state name
    pub state: &'static str,
    /// Remaining time on the countdown clock
    pub remaining_ms: u64,
    /// Announcements still pending in the working schedule
    pub pending: usize,
    /// Fraction of the countdown elapsed
    pub progress: f64,
}

/// Consumes the schedule against a live countdown clock
///
/// The schedule is exclusively owned by one dispatcher; all mutation happens
/// synchronously inside [`Dispatcher::tick`]. The canonical parsed directives
/// are never touched by dispatch; reset rebuilds a fresh working schedule
/// from them.
pub struct Dispatcher {
    /// Configuration
    config: DispatcherConfig,
    /// Total countdown duration
    duration_ms: u64,
    /// Canonical parse result
    directives: Vec<IntervalDirective>,
    /// Working schedule, consumed head-first
    schedule: Schedule,
    /// Current state
    state: DispatchState,
    /// Channel for emitting events
    events: mpsc::UnboundedSender<DispatchEvent>,
}

impl Dispatcher {
    /// Creates a new dispatcher
    ///
    /// Fails with a configuration error when the duration text does not
    /// match; malformed notation tokens are skipped, never fatal.
    pub fn new(config: DispatcherConfig, events: mpsc::UnboundedSender<DispatchEvent>) -> Result<Self> {
        let duration_ms = codec::parse_duration(&config.duration)?;
        let directives = notation::parse(&config.notation);
        let schedule = Schedule::build(&directives, duration_ms, config.merge_order);
        Ok(Dispatcher {
            config,
            duration_ms,
            directives,
            schedule,
            state: DispatchState::Idle,
            events,
        })
    }

    /// Starts the countdown, anchoring the end instant at `now + duration`
    pub fn start(&mut self, now: Instant) -> Result<()> {
        match self.state {
            DispatchState::Idle => {
                self.state = DispatchState::Running {
                    end_time: now + Duration::from_millis(self.duration_ms),
                };
                Ok(())
            }
            _ => Err(Error::invalid_state("can only start from Idle")),
        }
    }

    /// Freezes the dispatch clock
    pub fn pause(&mut self, now: Instant) -> Result<()> {
        match self.state {
            DispatchState::Running { end_time } => {
                self.state = DispatchState::Paused {
                    remaining_ms: remaining_at(end_time, now),
                };
                Ok(())
            }
            _ => Err(Error::invalid_state("can only pause while Running")),
        }
    }

    /// Re-anchors the end instant from the frozen remaining time
    pub fn resume(&mut self, now: Instant) -> Result<()> {
        match self.state {
            DispatchState::Paused { remaining_ms } => {
                self.state = DispatchState::Running {
                    end_time: now + Duration::from_millis(remaining_ms),
                };
                Ok(())
            }
            _ => Err(Error::invalid_state("can only resume while Paused")),
        }
    }

    /// Discards the working schedule, rebuilds it from the canonical
    /// directives, and returns to Idle
    pub fn reset(&mut self) {
        self.schedule = Schedule::build(&self.directives, self.duration_ms, self.config.merge_order);
        self.state = DispatchState::Idle;
    }

    /// Replaces notation and duration, then resets
    ///
    /// A bad duration is reported without touching the current configuration
    /// or state.
    pub fn reconfigure(&mut self, notation: &str, duration: &str) -> Result<()> {
        let duration_ms = codec::parse_duration(duration)?;
        self.config.notation = notation.to_string();
        self.config.duration = duration.to_string();
        self.duration_ms = duration_ms;
        self.directives = notation::parse(notation);
        self.reset();
        Ok(())
    }

    /// One re-evaluation of the countdown clock and the schedule head
    ///
    /// A no-op outside the Running state. Emits a display update, then pops
    /// every announcement whose offset plus the current speech lead has been
    /// reached; announcements further than the staleness window from the
    /// clock are dropped unspoken so a scheduling backlog cannot speak late.
    pub fn tick(&mut self, now: Instant) -> Result<()> {
        let end_time = match self.state {
            DispatchState::Running { end_time } => end_time,
            _ => return Ok(()),
        };

        let remaining_ms = remaining_at(end_time, now);
        self.send(DispatchEvent::Display {
            remaining_ms,
            progress: self.progress(remaining_ms),
        })?;

        if remaining_ms == 0 {
            self.state = DispatchState::Finished;
            return self.finish();
        }

        let lead_ms = self.config.lead_table.lead_for(remaining_ms);
        while let Some(announcement) = self.pop_due(remaining_ms, lead_ms) {
            if announcement.offset_ms.abs_diff(remaining_ms) < STALE_WINDOW_MS {
                trace!(offset_ms = announcement.offset_ms, remaining_ms, "emitting announcement");
                self.send(DispatchEvent::Announce {
                    message: announcement.message,
                })?;
            } else {
                debug!(
                    offset_ms = announcement.offset_ms,
                    remaining_ms, "dropping stale announcement"
                );
            }
        }

        Ok(())
    }

    /// Drives ticks at the configured cadence until the countdown finishes
    pub async fn run(&mut self) -> Result<()> {
        let mut ticker = interval(self.config.tick_interval);
        loop {
            ticker.tick().await;
            self.tick(Instant::now())?;
            if matches!(self.state, DispatchState::Finished) {
                return Ok(());
            }
        }
    }

    /// Remaining time on the countdown clock as of `now`
    pub fn remaining_ms(&self, now: Instant) -> u64 {
        match self.state {
            DispatchState::Idle => self.duration_ms,
            DispatchState::Running { end_time } => remaining_at(end_time, now),
            DispatchState::Paused { remaining_ms } => remaining_ms,
            DispatchState::Finished => 0,
        }
    }

    /// Gets information about the current state
    pub fn info(&self, now: Instant) -> DispatcherInfo {
        let remaining_ms = self.remaining_ms(now);
        DispatcherInfo {
            state: match self.state {
                DispatchState::Idle => "Idle",
                DispatchState::Running { .. } => "Running",
                DispatchState::Paused { .. } => "Paused",
                DispatchState::Finished => "Finished",
            },
            remaining_ms,
            pending: self.schedule.len(),
            progress: self.progress(remaining_ms),
        }
    }

    /// Pops the schedule head if its speak instant has arrived
    fn pop_due(&mut self, remaining_ms: u64, lead_ms: u64) -> Option<Announcement> {
        let due = self
            .schedule
            .head()
            .map_or(false, |head| head.offset_ms + lead_ms > remaining_ms);
        if due {
            self.schedule.pop()
        } else {
            None
        }
    }

    /// Flushes the end-of-countdown actions: end text, finished marker, and
    /// the delayed chime
    fn finish(&mut self) -> Result<()> {
        self.send(DispatchEvent::Announce {
            message: self.config.end_text.clone(),
        })?;
        self.send(DispatchEvent::Finished)?;

        // Fire-and-forget: once scheduled the chime fires even if the
        // dispatcher is torn down; a closed receiver swallows it.
        let events = self.events.clone();
        let delay = self.config.chime_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(DispatchEvent::Chime);
        });
        Ok(())
    }

    fn progress(&self, remaining_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            1.0
        } else {
            1.0 - remaining_ms as f64 / self.duration_ms as f64
        }
    }

    fn send(&self, event: DispatchEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|e| Error::dispatch(format!("event sink closed: {}", e)))
    }
}

/// Re-derives remaining time from the absolute end anchor
fn remaining_at(end_time: Instant, now: Instant) -> u64 {
    end_time.saturating_duration_since(now).as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::lead::LeadBand;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn dispatcher(notation: &str, duration: &str) -> (Dispatcher, UnboundedReceiver<DispatchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = DispatcherConfig {
            notation: notation.to_string(),
            duration: duration.to_string(),
            ..DispatcherConfig::default()
        };
        (Dispatcher::new(config, tx).unwrap(), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<DispatchEvent>) -> Vec<DispatchEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn announcements(events: &[DispatchEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                DispatchEvent::Announce { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_bad_duration_is_config_error() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = DispatcherConfig {
            duration: "bogus".to_string(),
            ..DispatcherConfig::default()
        };
        assert!(matches!(Dispatcher::new(config, tx), Err(Error::Config(_))));
    }

    #[test]
    fn test_state_transitions() {
        let (mut d, _rx) = dispatcher("1/2", "60");
        let t0 = Instant::now();

        assert_eq!(d.info(t0).state, "Idle");
        assert!(d.pause(t0).is_err());
        assert!(d.resume(t0).is_err());

        d.start(t0).unwrap();
        assert_eq!(d.info(t0).state, "Running");
        assert!(d.start(t0).is_err());

        d.pause(t0 + Duration::from_secs(10)).unwrap();
        assert_eq!(d.remaining_ms(t0), 50_000);

        d.resume(t0 + Duration::from_secs(25)).unwrap();
        assert_eq!(d.remaining_ms(t0 + Duration::from_secs(25)), 50_000);

        d.reset();
        assert_eq!(d.info(t0).state, "Idle");
        assert_eq!(d.remaining_ms(t0), 60_000);
    }

    #[test]
    fn test_tick_emits_display_updates() {
        let (mut d, mut rx) = dispatcher("", "60");
        let t0 = Instant::now();
        d.start(t0).unwrap();
        d.tick(t0 + Duration::from_secs(15)).unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            DispatchEvent::Display { remaining_ms, progress } => {
                assert_eq!(*remaining_ms, 45_000);
                assert!((progress - 0.25).abs() < 1e-9);
            }
            other => panic!("expected display update, got {:?}", other),
        }
    }

    #[test]
    fn test_announcement_fires_with_lead_compensation() {
        let (mut d, mut rx) = dispatcher("30s", "60");
        let t0 = Instant::now();
        d.start(t0).unwrap();

        // Remaining 31s: 30s offset plus the 900ms band lead is not reached
        d.tick(t0 + Duration::from_secs(29)).unwrap();
        assert!(announcements(&drain(&mut rx)).is_empty());

        // Remaining 30.4s: speak instruction goes out ahead of the offset
        d.tick(t0 + Duration::from_millis(29_600)).unwrap();
        let spoken = announcements(&drain(&mut rx));
        assert_eq!(spoken, vec!["30 seconds to go".to_string()]);
        assert_eq!(d.info(t0).pending, 0);
    }

    #[test]
    fn test_backlogged_announcement_dropped_silently() {
        let (mut d, mut rx) = dispatcher("30s", "60");
        let t0 = Instant::now();
        d.start(t0).unwrap();

        // The host stalled well past the offset; the stale cue must not speak
        d.tick(t0 + Duration::from_secs(45)).unwrap();
        assert!(announcements(&drain(&mut rx)).is_empty());
        assert_eq!(d.info(t0).pending, 0);
    }

    #[tokio::test]
    async fn test_finish_sequence() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = DispatcherConfig {
            notation: String::new(),
            duration: "1".to_string(),
            chime_delay: Duration::from_millis(10),
            ..DispatcherConfig::default()
        };
        let mut d = Dispatcher::new(config, tx).unwrap();
        let t0 = Instant::now();
        d.start(t0).unwrap();

        d.tick(t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(d.info(t0).state, "Finished");

        let events = drain(&mut rx);
        assert!(matches!(events[0], DispatchEvent::Display { remaining_ms: 0, .. }));
        assert_eq!(
            announcements(&events),
            vec![DispatcherConfig::default().end_text]
        );
        assert!(events.contains(&DispatchEvent::Finished));

        // Chime arrives after its delay, sequenced behind the end text
        assert_eq!(rx.recv().await, Some(DispatchEvent::Chime));
    }

    #[tokio::test]
    async fn test_chime_fires_after_dispatcher_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = DispatcherConfig {
            notation: String::new(),
            duration: "1".to_string(),
            chime_delay: Duration::from_millis(10),
            ..DispatcherConfig::default()
        };
        let mut d = Dispatcher::new(config, tx).unwrap();
        let t0 = Instant::now();
        d.start(t0).unwrap();
        d.tick(t0 + Duration::from_secs(1)).unwrap();
        drop(d);

        drain(&mut rx);
        assert_eq!(rx.recv().await, Some(DispatchEvent::Chime));
    }

    #[test]
    fn test_end_action_is_not_led() {
        // The end of the countdown fires at zero, never early via the lead
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = DispatcherConfig {
            notation: String::new(),
            duration: "5".to_string(),
            lead_table: LeadTable::new(vec![LeadBand { threshold_ms: u64::MAX, lead_ms: 200 }])
                .unwrap(),
            ..DispatcherConfig::default()
        };
        let mut d = Dispatcher::new(config, tx).unwrap();
        let t0 = Instant::now();
        d.start(t0).unwrap();

        d.tick(t0 + Duration::from_millis(4_900)).unwrap();
        assert_eq!(d.info(t0).state, "Running");
        assert!(announcements(&drain(&mut rx)).is_empty());
    }

    #[test]
    fn test_reset_rebuilds_consumed_schedule() {
        let (mut d, mut rx) = dispatcher("minutes allLast10", "180");
        let t0 = Instant::now();
        assert_eq!(d.info(t0).pending, 12);

        d.start(t0).unwrap();
        d.tick(t0 + Duration::from_millis(59_500)).unwrap();
        assert_eq!(
            announcements(&drain(&mut rx)),
            vec!["1 minute gone".to_string()]
        );
        assert_eq!(d.info(t0).pending, 11);

        d.reset();
        assert_eq!(d.info(t0).pending, 12);
        assert_eq!(d.info(t0).state, "Idle");
    }

    #[test]
    fn test_paused_clock_ticks_do_nothing() {
        let (mut d, mut rx) = dispatcher("30s", "60");
        let t0 = Instant::now();
        d.start(t0).unwrap();
        d.pause(t0 + Duration::from_secs(5)).unwrap();

        d.tick(t0 + Duration::from_secs(40)).unwrap();
        assert!(drain(&mut rx).is_empty());
        assert_eq!(d.remaining_ms(t0 + Duration::from_secs(40)), 55_000);
    }

    #[test]
    fn test_reconfigure_rebuilds() {
        let (mut d, _rx) = dispatcher("1/2", "60");
        let t0 = Instant::now();
        d.reconfigure("allLast10", "3:00").unwrap();
        assert_eq!(d.remaining_ms(t0), 180_000);
        assert_eq!(d.info(t0).pending, 10);
    }

    #[test]
    fn test_reconfigure_with_bad_duration_keeps_state() {
        let (mut d, _rx) = dispatcher("1/2", "60");
        let t0 = Instant::now();
        assert!(d.reconfigure("allLast10", "nope").is_err());
        assert_eq!(d.remaining_ms(t0), 60_000);
        assert_eq!(d.info(t0).pending, 1);
    }

    #[tokio::test]
    async fn test_run_drives_to_finished() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = DispatcherConfig {
            notation: String::new(),
            duration: "0".to_string(),
            chime_delay: Duration::from_millis(1),
            ..DispatcherConfig::default()
        };
        let mut d = Dispatcher::new(config, tx).unwrap();
        d.start(Instant::now()).unwrap();
        d.run().await.unwrap();

        let events = drain(&mut rx);
        assert!(events.contains(&DispatchEvent::Finished));
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = DispatcherConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: DispatcherConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
