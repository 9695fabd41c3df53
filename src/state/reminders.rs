use crate::state::store::JsonStore;
use anyhow::Result;
use chrono::{DateTime, TimeDelta, Utc};
use football_api::Match;
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::interval;

pub const TRIGGERED_KEY: &str = "triggered_match_ids";

/// Fixture ids whose reminder already fired. Persisted so a restart inside
/// the window does not fire again.
#[derive(Debug)]
pub struct TriggeredSet {
    kv: JsonStore,
    ids: BTreeSet<u64>,
}

impl TriggeredSet {
    pub fn load(kv: JsonStore) -> Self {
        let ids = match kv.get::<BTreeSet<u64>>(TRIGGERED_KEY) {
            Ok(ids) => ids.unwrap_or_default(),
            Err(e) => {
                warn!("ignoring stored reminder state: {e:#}");
                BTreeSet::new()
            }
        };
        Self { kv, ids }
    }

    pub fn ids(&self) -> &BTreeSet<u64> {
        &self.ids
    }

    #[cfg(test)]
    pub fn contains(&self, fixture_id: u64) -> bool {
        self.ids.contains(&fixture_id)
    }

    /// Forget ids that are no longer favorites, so the persisted set does
    /// not grow without bound. Writes only when something was dropped.
    pub fn retain_favorites(&mut self, favorites: &[Match]) -> Result<()> {
        let before = self.ids.len();
        self.ids.retain(|id| favorites.iter().any(|m| m.id() == *id));
        let dropped = before - self.ids.len();
        if dropped > 0 {
            debug!("pruned {dropped} stale reminder ids");
            self.kv.put(TRIGGERED_KEY, &self.ids)?;
        }
        Ok(())
    }

    /// Record the id and persist the whole set. The id stays recorded in
    /// memory even if the write fails.
    pub fn insert(&mut self, fixture_id: u64) -> Result<()> {
        if self.ids.insert(fixture_id) {
            self.kv.put(TRIGGERED_KEY, &self.ids)?;
        }
        Ok(())
    }
}

/// Favorites whose kickoff lies in `(now, now + window]` and that have not
/// been reminded yet, in list order.
pub fn due_reminders<'a>(
    favorites: &'a [Match],
    triggered: &BTreeSet<u64>,
    now: DateTime<Utc>,
    window: TimeDelta,
) -> Vec<&'a Match> {
    favorites
        .iter()
        .filter(|m| !triggered.contains(&m.id()))
        .filter(|m| {
            let until = m.kickoff() - now;
            until > TimeDelta::zero() && until <= window
        })
        .collect()
}

/// What the UI loop is told when a reminder fires.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderEvent {
    /// Ring the terminal bell.
    Vibrate { fixture_id: u64 },
    /// Show a "starting soon" notice.
    Notify(Reminder),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub fixture_id: u64,
    pub title: String,
    pub league: String,
    pub kickoff: DateTime<Utc>,
}

impl From<&Match> for Reminder {
    fn from(m: &Match) -> Self {
        Self {
            fixture_id: m.id(),
            title: m.title(),
            league: m.league.name.clone(),
            kickoff: m.kickoff(),
        }
    }
}

/// Where fired reminders go.
pub trait AlertSink {
    fn vibrate(&mut self, m: &Match);
    fn notify(&mut self, m: &Match);
}

/// Forwards reminders to the UI loop. Unbounded: the id is marked triggered
/// as soon as it fires, so an event must never be dropped for lack of room.
pub struct ChannelAlertSink {
    events: mpsc::UnboundedSender<ReminderEvent>,
}

impl ChannelAlertSink {
    pub fn new(events: mpsc::UnboundedSender<ReminderEvent>) -> Self {
        Self { events }
    }

    fn send(&self, event: ReminderEvent) {
        if let Err(e) = self.events.send(event) {
            warn!("UI loop is gone, dropping reminder event: {e}");
        }
    }
}

impl AlertSink for ChannelAlertSink {
    fn vibrate(&mut self, m: &Match) {
        self.send(ReminderEvent::Vibrate { fixture_id: m.id() });
    }

    fn notify(&mut self, m: &Match) {
        self.send(ReminderEvent::Notify(Reminder::from(m)));
    }
}

/// Polls the favorites on a fixed period and fires one alert per match
/// shortly before kickoff. Level-triggered: a window slept through is missed.
pub struct ReminderScheduler<S> {
    favorites: watch::Receiver<Vec<Match>>,
    triggered: TriggeredSet,
    sink: S,
    window: TimeDelta,
    period: Duration,
    notifications: bool,
}

impl<S: AlertSink> ReminderScheduler<S> {
    pub fn new(
        favorites: watch::Receiver<Vec<Match>>,
        triggered: TriggeredSet,
        sink: S,
        window: Duration,
        period: Duration,
        notifications: bool,
    ) -> Self {
        Self {
            favorites,
            triggered,
            sink,
            window: TimeDelta::from_std(window).unwrap_or(TimeDelta::seconds(60)),
            period,
            notifications,
        }
    }

    /// One poll. Returns the fixture ids that fired.
    pub fn check(&mut self, now: DateTime<Utc>) -> Vec<u64> {
        let due: Vec<Match> = {
            let favorites = self.favorites.borrow();
            due_reminders(&favorites, self.triggered.ids(), now, self.window)
                .into_iter()
                .cloned()
                .collect()
        };

        let mut fired = Vec::with_capacity(due.len());
        for m in &due {
            info!("{} kicks off at {}, sending reminder", m.title(), m.kickoff().format("%H:%M"));
            self.sink.vibrate(m);
            if self.notifications {
                self.sink.notify(m);
            } else {
                debug!("notifications not permitted, skipping notice for {}", m.id());
            }
            if let Err(e) = self.triggered.insert(m.id()) {
                error!("could not persist reminder state: {e:#}");
            }
            fired.push(m.id());
        }
        fired
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub async fn run(mut self) {
        let mut ticker = interval(self.period);
        loop {
            ticker.tick().await;
            self.check(Utc::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::{scratch_store, unwritable_store};
    use chrono::TimeZone;

    #[derive(Default)]
    struct RecordingSink {
        vibrations: Vec<u64>,
        notices: Vec<u64>,
    }

    impl AlertSink for RecordingSink {
        fn vibrate(&mut self, m: &Match) {
            self.vibrations.push(m.id());
        }

        fn notify(&mut self, m: &Match) {
            self.notices.push(m.id());
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 13, 17, 29, 0).unwrap()
    }

    fn kicking_off_in(id: u64, secs: i64) -> Match {
        let mut m = Match::default();
        m.fixture.id = id;
        m.fixture.timestamp = now().timestamp() + secs;
        m
    }

    fn scheduler(
        favorites: Vec<Match>,
        kv: JsonStore,
        notifications: bool,
    ) -> (watch::Sender<Vec<Match>>, ReminderScheduler<RecordingSink>) {
        let (tx, rx) = watch::channel(favorites);
        let scheduler = ReminderScheduler::new(
            rx,
            TriggeredSet::load(kv),
            RecordingSink::default(),
            Duration::from_secs(60),
            Duration::from_secs(3),
            notifications,
        );
        (tx, scheduler)
    }

    #[test]
    fn due_reminders_respects_window_bounds() {
        let favorites = vec![
            kicking_off_in(1, -10),
            kicking_off_in(2, 0),
            kicking_off_in(3, 1),
            kicking_off_in(4, 60),
            kicking_off_in(5, 61),
        ];
        let due: Vec<u64> = due_reminders(&favorites, &BTreeSet::new(), now(), TimeDelta::seconds(60))
            .into_iter()
            .map(Match::id)
            .collect();
        assert_eq!(due, vec![3, 4]);
    }

    #[test]
    fn due_reminders_skips_triggered_ids() {
        let favorites = vec![kicking_off_in(1, 30), kicking_off_in(2, 40)];
        let triggered: BTreeSet<u64> = [1].into_iter().collect();
        let due = due_reminders(&favorites, &triggered, now(), TimeDelta::seconds(60));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id(), 2);
    }

    #[test]
    fn fires_once_per_fixture() {
        let (_tx, mut scheduler) = scheduler(
            vec![kicking_off_in(1, 30), kicking_off_in(2, 3600)],
            scratch_store("remind-once"),
            true,
        );

        assert_eq!(scheduler.check(now()), vec![1]);
        assert!(scheduler.check(now() + TimeDelta::seconds(3)).is_empty());
        assert!(scheduler.check(now() + TimeDelta::seconds(6)).is_empty());
        assert_eq!(scheduler.sink().vibrations, vec![1]);
        assert_eq!(scheduler.sink().notices, vec![1]);
    }

    #[test]
    fn later_match_fires_when_it_enters_the_window() {
        let (_tx, mut scheduler) =
            scheduler(vec![kicking_off_in(1, 30), kicking_off_in(2, 90)], scratch_store("remind-later"), true);

        assert_eq!(scheduler.check(now()), vec![1]);
        assert_eq!(scheduler.check(now() + TimeDelta::seconds(31)), vec![2]);
        assert_eq!(scheduler.sink().vibrations, vec![1, 2]);
    }

    #[test]
    fn denied_notifications_still_vibrate() {
        let (_tx, mut scheduler) = scheduler(vec![kicking_off_in(9, 10)], scratch_store("remind-denied"), false);

        assert_eq!(scheduler.check(now()), vec![9]);
        assert_eq!(scheduler.sink().vibrations, vec![9]);
        assert!(scheduler.sink().notices.is_empty());
        assert!(scheduler.check(now()).is_empty());
    }

    #[test]
    fn triggered_ids_survive_restart() {
        let kv = scratch_store("remind-restart");
        let favorites = vec![kicking_off_in(5, 20)];

        let (_tx, mut first) = scheduler(favorites.clone(), kv.clone(), true);
        assert_eq!(first.check(now()), vec![5]);

        assert!(TriggeredSet::load(kv.clone()).contains(5));
        let (_tx, mut second) = scheduler(favorites, kv, true);
        assert!(second.check(now()).is_empty());
        assert!(second.sink().vibrations.is_empty());
    }

    #[test]
    fn unsaved_trigger_still_counts_for_this_run() {
        let (_tx, mut scheduler) =
            scheduler(vec![kicking_off_in(6, 30)], unwritable_store("remind-unwritable"), true);

        assert_eq!(scheduler.check(now()), vec![6]);
        assert!(scheduler.check(now() + TimeDelta::seconds(3)).is_empty());
        assert_eq!(scheduler.sink().vibrations, vec![6]);
    }

    #[test]
    fn stale_ids_are_pruned_and_saved() {
        let kv = scratch_store("remind-prune");
        let mut triggered = TriggeredSet::load(kv.clone());
        for id in [1, 2, 3] {
            triggered.insert(id).unwrap();
        }

        triggered.retain_favorites(&[kicking_off_in(2, -600)]).unwrap();
        assert_eq!(triggered.ids().iter().copied().collect::<Vec<_>>(), vec![2]);
        assert_eq!(
            TriggeredSet::load(kv).ids().iter().copied().collect::<Vec<_>>(),
            vec![2]
        );
    }

    #[test]
    fn pruning_nothing_skips_the_write() {
        let mut triggered = TriggeredSet::load(unwritable_store("remind-prune-noop"));
        assert!(triggered.retain_favorites(&[]).is_ok());
    }

    #[test]
    fn picks_up_favorites_published_after_start() {
        let (tx, mut scheduler) = scheduler(Vec::new(), scratch_store("remind-watch"), true);
        assert!(scheduler.check(now()).is_empty());

        tx.send_replace(vec![kicking_off_in(3, 45)]);
        assert_eq!(scheduler.check(now()), vec![3]);
    }

    #[test]
    fn removed_favorite_does_not_fire() {
        let (tx, mut scheduler) = scheduler(vec![kicking_off_in(4, 500)], scratch_store("remind-removed"), true);
        tx.send_replace(Vec::new());
        assert!(scheduler.check(now() + TimeDelta::seconds(480)).is_empty());
    }

    #[tokio::test]
    async fn channel_sink_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut sink = ChannelAlertSink::new(tx);
        let mut m = kicking_off_in(12, 30);
        m.teams.home.name = "Brentford".into();
        m.teams.away.name = "Chelsea".into();

        sink.vibrate(&m);
        sink.notify(&m);

        assert_eq!(rx.recv().await, Some(ReminderEvent::Vibrate { fixture_id: 12 }));
        match rx.recv().await {
            Some(ReminderEvent::Notify(reminder)) => {
                assert_eq!(reminder.fixture_id, 12);
                assert_eq!(reminder.title, "Brentford vs Chelsea");
            }
            other => panic!("expected notice, got {other:?}"),
        }
    }

    #[test]
    fn burst_of_reminders_is_not_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let favorites: Vec<Match> = (1..=200).map(|id| kicking_off_in(id, 30)).collect();
        let (_fav_tx, fav_rx) = watch::channel(favorites);
        let mut scheduler = ReminderScheduler::new(
            fav_rx,
            TriggeredSet::load(scratch_store("remind-burst")),
            ChannelAlertSink::new(tx),
            Duration::from_secs(60),
            Duration::from_secs(3),
            true,
        );

        assert_eq!(scheduler.check(now()).len(), 200);
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 400);
    }
}
