// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The recurrence engine: daily subscription cycle and auto-join sweep.
//!
//! Both entry points are batch operations. A failure on one item is logged
//! and never aborts the remaining items; re-running a cycle is safe because
//! duplicate bookings and duplicate rows are both benign.

use std::sync::Arc;

use beatbot_config::model::{SchedulerConfig, SeriesAnchor};
use beatbot_core::traits::BookingApi;
use beatbot_core::types::Event;
use beatbot_core::BeatbotError;
use beatbot_storage::models::Subscription;
use beatbot_storage::queries::{autojoins, subscriptions, users};
use beatbot_storage::Database;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::resolver;

/// Aggregate counters for one subscription cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleStats {
    /// Subscriptions visited.
    pub subscriptions: usize,
    /// Tickets newly created.
    pub booked: usize,
    /// Bookings that already existed.
    pub duplicates: usize,
    /// Chains stopped early (no event, no token, provider failure).
    pub stopped: usize,
}

/// Aggregate counters for one auto-join sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepStats {
    /// Intents visited.
    pub pending: usize,
    /// Intents completed (booked, or already booked) and deleted.
    pub completed: usize,
    /// Intents deleted because they exceeded the age bound.
    pub abandoned: usize,
    /// Intents left pending after a failed attempt.
    pub failed: usize,
}

/// Drives recurring registrations and auto-join retries against the
/// booking provider.
pub struct RecurrenceEngine {
    api: Arc<dyn BookingApi>,
    db: Arc<Database>,
    horizon_days: i64,
    anchor: SeriesAnchor,
    autojoin_max_age_days: i64,
}

impl RecurrenceEngine {
    pub fn new(api: Arc<dyn BookingApi>, db: Arc<Database>, config: &SchedulerConfig) -> Self {
        Self {
            api,
            db,
            horizon_days: config.horizon_days,
            anchor: config.series_anchor,
            autojoin_max_age_days: config.autojoin_max_age_days,
        }
    }

    /// Run the daily subscription cycle at the current time.
    pub async fn run_cycle(&self) -> Result<CycleStats, BeatbotError> {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run the subscription cycle as of `now`. Split out for tests.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> Result<CycleStats, BeatbotError> {
        let subs = subscriptions::list_subscriptions(&self.db).await?;
        let mut stats = CycleStats::default();
        info!(count = subs.len(), "subscription cycle started");

        for sub in subs {
            stats.subscriptions += 1;
            match self.process_subscription(&sub, now).await {
                Ok(outcome) => {
                    stats.booked += outcome.booked;
                    stats.duplicates += outcome.duplicates;
                    if outcome.stopped {
                        stats.stopped += 1;
                    }
                }
                Err(e) => {
                    stats.stopped += 1;
                    warn!(
                        subscription_id = sub.id,
                        error = %e,
                        "subscription chain failed",
                    );
                }
            }
        }

        info!(
            booked = stats.booked,
            duplicates = stats.duplicates,
            stopped = stats.stopped,
            "subscription cycle finished",
        );
        Ok(stats)
    }

    /// Walk one subscription's chain of weekly candidates within the horizon.
    async fn process_subscription(
        &self,
        sub: &Subscription,
        now: DateTime<Utc>,
    ) -> Result<ChainOutcome, BeatbotError> {
        let mut outcome = ChainOutcome::default();

        let Some(user) = users::get_user_by_telegram_id(&self.db, &sub.telegram_user_id).await?
        else {
            warn!(subscription_id = sub.id, "subscription has no user row");
            outcome.stopped = true;
            return Ok(outcome);
        };
        let Some(token) = user.token.clone() else {
            warn!(
                subscription_id = sub.id,
                telegram_user_id = %sub.telegram_user_id,
                "user has no valid token, skipping chain",
            );
            outcome.stopped = true;
            return Ok(outcome);
        };

        let today = now.date_naive();
        let horizon = today + Duration::days(self.horizon_days);
        let next = resolver::next_occurrence(sub.day_of_week, today);
        let anchor = match self.anchor {
            SeriesAnchor::NextWeek => next + Duration::days(7),
            SeriesAnchor::Nearest => next,
        };
        // Time-of-day only validates the stored slot; matching is by
        // location within the candidate day.
        sub.target_time()?;

        let mut candidate = anchor;
        while candidate <= horizon {
            let event = match self.find_slot_event(sub, candidate).await? {
                Some(event) => event,
                None => {
                    warn!(
                        subscription_id = sub.id,
                        date = %candidate,
                        "no matching event on candidate date, stopping chain",
                    );
                    outcome.stopped = true;
                    return Ok(outcome);
                }
            };

            match self
                .api
                .create_ticket(&token, &event.id, &user.provider_user_id)
                .await
            {
                Ok(ticket) => {
                    debug!(
                        subscription_id = sub.id,
                        event_id = %event.id,
                        ticket_id = %ticket.id,
                        "registered for event",
                    );
                    outcome.booked += 1;
                }
                Err(e) if e.is_duplicate() => {
                    debug!(
                        subscription_id = sub.id,
                        event_id = %event.id,
                        "already registered, continuing chain",
                    );
                    outcome.duplicates += 1;
                }
                Err(e) => {
                    warn!(
                        subscription_id = sub.id,
                        event_id = %event.id,
                        error = %e,
                        "registration failed, stopping chain",
                    );
                    outcome.stopped = true;
                    return Ok(outcome);
                }
            }

            candidate += Duration::days(7);
        }

        Ok(outcome)
    }

    /// The first bookable event at the subscription's location on `date`.
    async fn find_slot_event(
        &self,
        sub: &Subscription,
        date: NaiveDate,
    ) -> Result<Option<Event>, BeatbotError> {
        let from = date.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
        let to = (date + Duration::days(1)).and_hms_opt(0, 0, 0).map(|n| n.and_utc());
        let (Some(from), Some(to)) = (from, to) else {
            return Err(BeatbotError::Internal(format!(
                "invalid candidate date {date}"
            )));
        };

        let events = self.api.list_events(sub.city, from, to, 200).await?;
        Ok(events
            .into_iter()
            .find(|e| e.location.id == sub.location_id && e.is_bookable()))
    }

    /// Book an event and its weekly successors at the same location,
    /// up to the horizon. Used when a user registers a series from chat.
    ///
    /// Duplicates along the chain are benign; the count of new bookings
    /// is returned. A missing successor event ends the chain quietly.
    pub async fn book_series(
        &self,
        token: &str,
        provider_user_id: &str,
        event: &Event,
        now: DateTime<Utc>,
    ) -> Result<usize, BeatbotError> {
        let mut booked = 0;

        match self.api.create_ticket(token, &event.id, provider_user_id).await {
            Ok(_) => booked += 1,
            Err(e) if e.is_duplicate() => {}
            Err(e) => return Err(e),
        }

        let Some(city) = event
            .location
            .city_code
            .as_deref()
            .and_then(|code| code.parse::<beatbot_core::types::City>().ok())
        else {
            warn!(event_id = %event.id, "event has no usable city code, chain ends");
            return Ok(booked);
        };

        let today = now.date_naive();
        let horizon = today + Duration::days(self.horizon_days);
        let mut candidate = event.date_begin.date_naive() + Duration::days(7);

        while candidate <= horizon {
            let from = candidate
                .and_hms_opt(0, 0, 0)
                .map(|n| n.and_utc())
                .ok_or_else(|| BeatbotError::Internal(format!("invalid date {candidate}")))?;
            let to = from + Duration::days(1);
            let events = self.api.list_events(city, from, to, 200).await?;
            let Some(next) = events
                .into_iter()
                .find(|e| e.location.id == event.location.id && e.is_bookable())
            else {
                debug!(date = %candidate, "no successor event, series chain ends");
                break;
            };

            match self.api.create_ticket(token, &next.id, provider_user_id).await {
                Ok(_) => booked += 1,
                Err(e) if e.is_duplicate() => {}
                Err(e) => return Err(e),
            }
            candidate += Duration::days(7);
        }

        Ok(booked)
    }

    /// Run the auto-join sweep at the current time.
    pub async fn run_sweep(&self) -> Result<SweepStats, BeatbotError> {
        self.run_sweep_at(Utc::now()).await
    }

    /// Run the auto-join sweep as of `now`. Split out for tests.
    pub async fn run_sweep_at(&self, now: DateTime<Utc>) -> Result<SweepStats, BeatbotError> {
        let intents = autojoins::list_autojoins(&self.db).await?;
        let mut stats = SweepStats::default();

        for intent in intents {
            stats.pending += 1;

            if self.autojoin_max_age_days > 0 {
                match resolver::parse_provider_timestamp(&intent.created_at) {
                    Ok(created) if now - created > Duration::days(self.autojoin_max_age_days) => {
                        warn!(
                            intent_id = intent.id,
                            event_id = %intent.event_id,
                            "auto-join intent aged out, abandoning",
                        );
                        autojoins::delete_autojoin(&self.db, intent.id).await?;
                        stats.abandoned += 1;
                        continue;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(
                            intent_id = intent.id,
                            error = %e,
                            "unreadable intent timestamp, skipping age check",
                        );
                    }
                }
            }

            let Some(user) =
                users::get_user_by_telegram_id(&self.db, &intent.telegram_user_id).await?
            else {
                warn!(intent_id = intent.id, "auto-join intent has no user row");
                autojoins::delete_autojoin(&self.db, intent.id).await?;
                continue;
            };
            let Some(token) = user.token.clone() else {
                debug!(
                    intent_id = intent.id,
                    "user has no valid token, leaving intent pending",
                );
                stats.failed += 1;
                continue;
            };

            match self
                .api
                .create_ticket(&token, &intent.event_id, &user.provider_user_id)
                .await
            {
                Ok(_) => {
                    info!(
                        intent_id = intent.id,
                        event_id = %intent.event_id,
                        "auto-join succeeded",
                    );
                    autojoins::delete_autojoin(&self.db, intent.id).await?;
                    stats.completed += 1;
                }
                Err(e) if e.is_duplicate() => {
                    // Already booked through another path; the intent is done.
                    autojoins::delete_autojoin(&self.db, intent.id).await?;
                    stats.completed += 1;
                }
                Err(e) => {
                    debug!(
                        intent_id = intent.id,
                        event_id = %intent.event_id,
                        error = %e,
                        "auto-join attempt failed, will retry",
                    );
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}

#[derive(Debug, Default)]
struct ChainOutcome {
    booked: usize,
    duplicates: usize,
    stopped: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use beatbot_core::types::{AuthSession, City, EventLocation, Ticket, Weekday};
    use beatbot_storage::models::{NewAutoJoin, NewSubscription, NewUser};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Scripted provider double. Events are keyed by date; `create_ticket`
    /// consults a per-event response script and records every call.
    #[derive(Default)]
    struct ScriptedApi {
        events: Mutex<HashMap<NaiveDate, Vec<Event>>>,
        rejections: Mutex<HashMap<String, &'static str>>,
        booked: Mutex<Vec<String>>,
    }

    impl ScriptedApi {
        fn add_event(&self, date: NaiveDate, event: Event) {
            self.events.lock().unwrap().entry(date).or_default().push(event);
        }

        fn reject(&self, event_id: &str, kind: &'static str) {
            self.rejections
                .lock()
                .unwrap()
                .insert(event_id.to_string(), kind);
        }

        fn booked_ids(&self) -> Vec<String> {
            self.booked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BookingApi for ScriptedApi {
        async fn authenticate(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<AuthSession, BeatbotError> {
            unimplemented!("not used by the engine")
        }

        async fn list_tickets(
            &self,
            _token: &str,
            _provider_user_id: &str,
        ) -> Result<Vec<Ticket>, BeatbotError> {
            Ok(Vec::new())
        }

        async fn cancel_ticket(
            &self,
            _token: &str,
            _ticket_id: &str,
        ) -> Result<(), BeatbotError> {
            Ok(())
        }

        async fn get_ticket(
            &self,
            _token: &str,
            _ticket_id: &str,
        ) -> Result<Ticket, BeatbotError> {
            unimplemented!("not used by the engine")
        }

        async fn get_event(&self, _event_id: &str) -> Result<Event, BeatbotError> {
            unimplemented!("not used by the engine")
        }

        async fn list_events(
            &self,
            _city: City,
            from: DateTime<Utc>,
            _to: DateTime<Utc>,
            _limit: u32,
        ) -> Result<Vec<Event>, BeatbotError> {
            let events = self.events.lock().unwrap();
            Ok(events.get(&from.date_naive()).cloned().unwrap_or_default())
        }

        async fn create_ticket(
            &self,
            _token: &str,
            event_id: &str,
            _provider_user_id: &str,
        ) -> Result<Ticket, BeatbotError> {
            if let Some(kind) = self.rejections.lock().unwrap().get(event_id) {
                return Err(match *kind {
                    "duplicate" => BeatbotError::Duplicate {
                        what: event_id.to_string(),
                    },
                    "unauthorized" => BeatbotError::Unauthorized,
                    _ => BeatbotError::Transport {
                        message: "scripted failure".to_string(),
                        source: None,
                    },
                });
            }
            self.booked.lock().unwrap().push(event_id.to_string());
            Ok(Ticket {
                id: format!("ticket-for-{event_id}"),
                status: Some("confirmed".to_string()),
                event: None,
            })
        }
    }

    fn event_at(id: &str, location_id: &str, date_begin: DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            date_begin,
            location: EventLocation {
                id: location_id.to_string(),
                name: "Gym".to_string(),
                city_code: Some("munich".to_string()),
                address: None,
            },
            max_participants: 20,
            participants_count: 3,
            is_published: true,
            status: Some("published".to_string()),
        }
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
            .and_utc()
    }

    async fn setup_db() -> (Arc<Database>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (Arc::new(db), dir)
    }

    async fn seed_user(db: &Database, tg: &str, token: Option<&str>) -> i64 {
        users::create_user(
            db,
            &NewUser {
                telegram_user_id: tg.to_string(),
                provider_user_id: format!("p-{tg}"),
                email: format!("{tg}@example.com"),
                token: token.unwrap_or("tok").to_string(),
                first_name: None,
                last_name: None,
            },
        )
        .await
        .unwrap();
        if token.is_none() {
            users::clear_token(db, tg).await.unwrap();
        }
        users::get_user_by_telegram_id(db, tg)
            .await
            .unwrap()
            .unwrap()
            .id
    }

    async fn seed_subscription(db: &Database, user_id: i64, tg: &str) {
        subscriptions::create_subscription(
            db,
            &NewSubscription {
                user_id,
                telegram_user_id: tg.to_string(),
                location_id: "loc-1".to_string(),
                city: City::Munich,
                day_of_week: Weekday::Monday,
                time: "18:00".to_string(),
            },
        )
        .await
        .unwrap();
    }

    fn engine_with(
        api: Arc<ScriptedApi>,
        db: Arc<Database>,
        anchor: SeriesAnchor,
    ) -> RecurrenceEngine {
        let config = SchedulerConfig {
            series_anchor: anchor,
            ..SchedulerConfig::default()
        };
        RecurrenceEngine::new(api, db, &config)
    }

    /// Wednesday 2026-09-02; the next Monday is 2026-09-07.
    const NOW: (i32, u32, u32) = (2026, 9, 2);

    fn now() -> DateTime<Utc> {
        utc(NOW.0, NOW.1, NOW.2, 0)
    }

    fn seed_mondays(api: &ScriptedApi) {
        for (idx, day) in [7u32, 14, 21, 28].iter().enumerate() {
            let date = NaiveDate::from_ymd_opt(2026, 9, *day).unwrap();
            api.add_event(
                date,
                event_at(&format!("ev-{idx}"), "loc-1", utc(2026, 9, *day, 16)),
            );
        }
    }

    #[tokio::test]
    async fn next_week_anchor_books_within_horizon_only() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", Some("tok")).await;
        seed_subscription(&db, uid, "tg-1").await;

        let api = Arc::new(ScriptedApi::default());
        seed_mondays(&api);

        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);
        let stats = engine.run_cycle_at(now()).await.unwrap();

        // Anchor is 09-14; 09-28 exceeds today + 21 days (09-23).
        assert_eq!(api.booked_ids(), vec!["ev-1", "ev-2"]);
        assert_eq!(stats.booked, 2);
        assert_eq!(stats.stopped, 0);
    }

    #[tokio::test]
    async fn nearest_anchor_starts_at_the_next_match() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", Some("tok")).await;
        seed_subscription(&db, uid, "tg-1").await;

        let api = Arc::new(ScriptedApi::default());
        seed_mondays(&api);

        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::Nearest);
        let stats = engine.run_cycle_at(now()).await.unwrap();

        assert_eq!(api.booked_ids(), vec!["ev-0", "ev-1", "ev-2"]);
        assert_eq!(stats.booked, 3);
    }

    #[tokio::test]
    async fn duplicate_booking_is_benign_and_chain_continues() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", Some("tok")).await;
        seed_subscription(&db, uid, "tg-1").await;

        let api = Arc::new(ScriptedApi::default());
        seed_mondays(&api);
        api.reject("ev-1", "duplicate");

        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);
        let stats = engine.run_cycle_at(now()).await.unwrap();

        assert_eq!(api.booked_ids(), vec!["ev-2"]);
        assert_eq!(stats.booked, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.stopped, 0);
    }

    #[tokio::test]
    async fn provider_failure_stops_only_that_chain() {
        let (db, _dir) = setup_db().await;
        let u1 = seed_user(&db, "tg-1", Some("tok")).await;
        seed_subscription(&db, u1, "tg-1").await;
        let u2 = seed_user(&db, "tg-2", Some("tok")).await;
        subscriptions::create_subscription(
            &db,
            &NewSubscription {
                user_id: u2,
                telegram_user_id: "tg-2".to_string(),
                location_id: "loc-2".to_string(),
                city: City::Munich,
                day_of_week: Weekday::Monday,
                time: "19:00".to_string(),
            },
        )
        .await
        .unwrap();

        let api = Arc::new(ScriptedApi::default());
        seed_mondays(&api);
        for day in [14u32, 21] {
            let date = NaiveDate::from_ymd_opt(2026, 9, day).unwrap();
            api.add_event(date, event_at(&format!("other-{day}"), "loc-2", utc(2026, 9, day, 17)));
        }
        api.reject("ev-1", "transport");

        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);
        let stats = engine.run_cycle_at(now()).await.unwrap();

        // tg-1's chain stops on its first event; tg-2's is unaffected.
        assert_eq!(api.booked_ids(), vec!["other-14", "other-21"]);
        assert_eq!(stats.subscriptions, 2);
        assert_eq!(stats.stopped, 1);
        assert_eq!(stats.booked, 2);
    }

    #[tokio::test]
    async fn missing_event_is_a_soft_stop() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", Some("tok")).await;
        seed_subscription(&db, uid, "tg-1").await;

        let api = Arc::new(ScriptedApi::default());
        // No events scripted at all.
        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);
        let stats = engine.run_cycle_at(now()).await.unwrap();

        assert!(api.booked_ids().is_empty());
        assert_eq!(stats.stopped, 1);
    }

    #[tokio::test]
    async fn user_without_token_is_skipped() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", None).await;
        seed_subscription(&db, uid, "tg-1").await;

        let api = Arc::new(ScriptedApi::default());
        seed_mondays(&api);

        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);
        let stats = engine.run_cycle_at(now()).await.unwrap();

        assert!(api.booked_ids().is_empty());
        assert_eq!(stats.stopped, 1);
    }

    #[tokio::test]
    async fn rerunning_a_cycle_creates_no_new_bookings() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", Some("tok")).await;
        seed_subscription(&db, uid, "tg-1").await;

        let api = Arc::new(ScriptedApi::default());
        seed_mondays(&api);

        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);
        engine.run_cycle_at(now()).await.unwrap();

        // The provider now rejects re-registration as duplicate.
        api.reject("ev-1", "duplicate");
        api.reject("ev-2", "duplicate");
        let stats = engine.run_cycle_at(now()).await.unwrap();

        assert_eq!(stats.booked, 0);
        assert_eq!(stats.duplicates, 2);
        assert_eq!(api.booked_ids().len(), 2);
    }

    #[tokio::test]
    async fn series_booking_walks_successors_within_horizon() {
        let (db, _dir) = setup_db().await;
        let api = Arc::new(ScriptedApi::default());
        seed_mondays(&api);

        let engine = engine_with(api.clone(), db, SeriesAnchor::NextWeek);
        let first = event_at("ev-0", "loc-1", utc(2026, 9, 7, 16));
        let booked = engine
            .book_series("tok", "p-1", &first, now())
            .await
            .unwrap();

        // 09-07 plus 09-14 and 09-21; 09-28 is past today + 21 days.
        assert_eq!(booked, 3);
        assert_eq!(api.booked_ids(), vec!["ev-0", "ev-1", "ev-2"]);
    }

    #[tokio::test]
    async fn series_booking_tolerates_existing_tickets() {
        let (db, _dir) = setup_db().await;
        let api = Arc::new(ScriptedApi::default());
        seed_mondays(&api);
        api.reject("ev-0", "duplicate");

        let engine = engine_with(api.clone(), db, SeriesAnchor::NextWeek);
        let first = event_at("ev-0", "loc-1", utc(2026, 9, 7, 16));
        let booked = engine
            .book_series("tok", "p-1", &first, now())
            .await
            .unwrap();

        assert_eq!(booked, 2);
        assert_eq!(api.booked_ids(), vec!["ev-1", "ev-2"]);
    }

    async fn seed_intent(db: &Database, user_id: i64, tg: &str, event_id: &str) -> i64 {
        autojoins::create_autojoin(
            db,
            &NewAutoJoin {
                user_id,
                telegram_user_id: tg.to_string(),
                ticket_id: None,
                event_id: event_id.to_string(),
            },
        )
        .await
        .unwrap();
        autojoins::list_autojoins(db)
            .await
            .unwrap()
            .into_iter()
            .find(|i| i.event_id == event_id)
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn sweep_deletes_intent_on_success() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", Some("tok")).await;
        seed_intent(&db, uid, "tg-1", "ev-full").await;

        let api = Arc::new(ScriptedApi::default());
        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);
        let stats = engine.run_sweep_at(now()).await.unwrap();

        assert_eq!(stats.completed, 1);
        assert_eq!(api.booked_ids(), vec!["ev-full"]);
        assert!(autojoins::list_autojoins(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sweep_treats_duplicate_as_completed() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", Some("tok")).await;
        seed_intent(&db, uid, "tg-1", "ev-full").await;

        let api = Arc::new(ScriptedApi::default());
        api.reject("ev-full", "duplicate");
        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);
        let stats = engine.run_sweep_at(now()).await.unwrap();

        assert_eq!(stats.completed, 1);
        assert!(autojoins::list_autojoins(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sweep_leaves_intent_on_failure() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", Some("tok")).await;
        seed_intent(&db, uid, "tg-1", "ev-full").await;

        let api = Arc::new(ScriptedApi::default());
        api.reject("ev-full", "transport");
        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);
        let stats = engine.run_sweep_at(now()).await.unwrap();

        assert_eq!(stats.completed, 0);
        assert_eq!(stats.failed, 1);
        assert_eq!(autojoins::list_autojoins(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn sweep_abandons_aged_out_intents() {
        let (db, _dir) = setup_db().await;
        let uid = seed_user(&db, "tg-1", Some("tok")).await;
        seed_intent(&db, uid, "tg-1", "ev-old").await;

        let api = Arc::new(ScriptedApi::default());
        api.reject("ev-old", "transport");
        let engine = engine_with(api.clone(), db.clone(), SeriesAnchor::NextWeek);

        // Far enough in the future to exceed the 14-day default bound.
        let later = now() + Duration::days(30);
        let stats = engine.run_sweep_at(later).await.unwrap();

        assert_eq!(stats.abandoned, 1);
        assert!(autojoins::list_autojoins(&db).await.unwrap().is_empty());
    }
}
