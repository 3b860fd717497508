// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram chat front end.
//!
//! A teloxide dispatcher with two branches: text messages (the `/start`
//! command and the login conversation) and inline-button callbacks (all
//! navigation and booking actions). Provider failures render a generic
//! apology; a 401 clears the stored token and re-prompts login.

pub mod format;
pub mod handler;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use beatbot_config::model::{DisplayConfig, TelegramConfig};
use beatbot_core::traits::BookingApi;
use beatbot_core::types::{City, Event, Weekday};
use beatbot_core::BeatbotError;
use beatbot_recurrence::resolver;
use beatbot_recurrence::RecurrenceEngine;
use beatbot_storage::models::{NewAutoJoin, NewSubscription, NewUser, User};
use beatbot_storage::queries::{autojoins, subscriptions, users};
use beatbot_storage::Database;
use chrono::{Datelike, Utc};
use chrono_tz::Tz;
use teloxide::prelude::*;
use teloxide::types::ChatId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handler::Callback;
use crate::session::{LoginFlow, SessionStore};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Shared state injected into every handler invocation.
pub struct BotContext {
    pub api: Arc<dyn BookingApi>,
    pub db: Arc<Database>,
    pub engine: Arc<RecurrenceEngine>,
    pub sessions: Arc<SessionStore>,
    pub tz: Tz,
}

impl BotContext {
    pub fn new(
        api: Arc<dyn BookingApi>,
        db: Arc<Database>,
        engine: Arc<RecurrenceEngine>,
        display: &DisplayConfig,
    ) -> Result<Self, BeatbotError> {
        let tz: Tz = display
            .timezone
            .parse()
            .map_err(|_| BeatbotError::Config(format!("invalid timezone {:?}", display.timezone)))?;
        Ok(Self {
            api,
            db,
            engine,
            sessions: Arc::new(SessionStore::new(Duration::from_secs(
                display.session_ttl_secs,
            ))),
            tz,
        })
    }
}

/// Create the bot from configuration. The token is required to serve.
pub fn build_bot(config: &TelegramConfig) -> Result<Bot, BeatbotError> {
    let token = config
        .bot_token
        .as_deref()
        .ok_or_else(|| BeatbotError::Config("telegram.bot_token is required".into()))?;
    if token.is_empty() {
        return Err(BeatbotError::Config(
            "telegram.bot_token cannot be empty".into(),
        ));
    }
    Ok(Bot::new(token))
}

/// Run the dispatcher until `cancel` fires.
pub async fn run(bot: Bot, ctx: Arc<BotContext>, cancel: CancellationToken) {
    let tree = dptree::entry()
        .branch(Update::filter_message().endpoint(on_message))
        .branch(Update::filter_callback_query().endpoint(on_callback));

    let mut dispatcher = Dispatcher::builder(bot, tree)
        .dependencies(dptree::deps![ctx])
        .default_handler(|_| async {})
        .build();

    let shutdown = dispatcher.shutdown_token();
    tokio::spawn(async move {
        cancel.cancelled().await;
        info!("stopping Telegram dispatcher");
        if let Ok(wait) = shutdown.shutdown() {
            wait.await;
        }
    });

    info!("starting Telegram long polling");
    dispatcher.dispatch().await;
}

async fn on_message(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> HandlerResult {
    let Some(from) = msg.from.as_ref() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let telegram_user_id = from.id.to_string();
    let chat_id = msg.chat.id;

    if text == "/start" {
        let logged_in = is_logged_in(&ctx, &telegram_user_id).await;
        bot.send_message(chat_id, format::MENU_TEXT)
            .reply_markup(format::main_menu(logged_in))
            .await?;
        return Ok(());
    }

    match ctx.sessions.get(&telegram_user_id) {
        Some(LoginFlow::AwaitEmail) => {
            ctx.sessions.set(
                &telegram_user_id,
                LoginFlow::AwaitPassword {
                    email: text.to_string(),
                },
            );
            bot.send_message(chat_id, format::ASK_PASSWORD_TEXT).await?;
        }
        Some(LoginFlow::AwaitPassword { email }) => {
            ctx.sessions.clear(&telegram_user_id);
            handle_login(&bot, chat_id, &ctx, &telegram_user_id, &email, text).await?;
        }
        None => {
            bot.send_message(chat_id, "Send /start to open the menu.")
                .await?;
        }
    }
    Ok(())
}

async fn handle_login(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &BotContext,
    telegram_user_id: &str,
    email: &str,
    password: &str,
) -> HandlerResult {
    match ctx.api.authenticate(email, password).await {
        Ok(auth) => {
            let created = users::create_user(
                &ctx.db,
                &NewUser {
                    telegram_user_id: telegram_user_id.to_string(),
                    provider_user_id: auth.provider_user_id.clone(),
                    email: auth.email.clone(),
                    token: auth.access_token.clone(),
                    first_name: non_empty(&auth.given_name),
                    last_name: non_empty(&auth.family_name),
                },
            )
            .await?;
            if !created {
                users::update_token(&ctx.db, telegram_user_id, &auth.access_token).await?;
            }
            info!(telegram_user_id, "login succeeded");
            bot.send_message(chat_id, format::LOGIN_OK_TEXT)
                .reply_markup(format::main_menu(true))
                .await?;
        }
        Err(e) if e.is_unauthorized() => {
            debug!(telegram_user_id, "login rejected");
            bot.send_message(chat_id, format::LOGIN_FAILED_TEXT)
                .reply_markup(format::main_menu(false))
                .await?;
        }
        Err(e) => {
            warn!(telegram_user_id, error = %e, "login attempt failed");
            bot.send_message(chat_id, format::FAILURE_TEXT).await?;
        }
    }
    Ok(())
}

async fn on_callback(bot: Bot, q: CallbackQuery, ctx: Arc<BotContext>) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let Some(callback) = q.data.as_deref().and_then(Callback::parse) else {
        debug!(data = ?q.data, "ignoring unknown callback data");
        return Ok(());
    };
    let telegram_user_id = q.from.id.to_string();
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(q.from.id.0 as i64));

    if let Err(e) = dispatch_callback(&bot, chat_id, &ctx, &telegram_user_id, callback).await {
        if e.is_unauthorized() {
            // Stale token: drop it and restart the login flow.
            users::clear_token(&ctx.db, &telegram_user_id).await.ok();
            bot.send_message(chat_id, format::SESSION_EXPIRED_TEXT)
                .reply_markup(format::main_menu(false))
                .await?;
        } else {
            warn!(telegram_user_id, error = %e, "callback handling failed");
            bot.send_message(chat_id, format::FAILURE_TEXT)
                .reply_markup(format::main_menu(
                    is_logged_in(&ctx, &telegram_user_id).await,
                ))
                .await?;
        }
    }
    Ok(())
}

async fn dispatch_callback(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &BotContext,
    telegram_user_id: &str,
    callback: Callback,
) -> Result<(), BeatbotError> {
    match callback {
        Callback::Login => {
            ctx.sessions.begin(telegram_user_id);
            send(bot, chat_id, format::ASK_EMAIL_TEXT).await?;
        }
        Callback::MainMenu => {
            let logged_in = is_logged_in(ctx, telegram_user_id).await;
            send_with(bot, chat_id, format::MENU_TEXT, format::main_menu(logged_in)).await?;
        }
        Callback::MyBookings => {
            let Some((user, token)) = auth(ctx, telegram_user_id).await? else {
                return prompt_login(bot, chat_id).await;
            };
            let tickets = ctx.api.list_tickets(&token, &user.provider_user_id).await?;
            send_with(
                bot,
                chat_id,
                &format!("Total bookings: {}", tickets.len()),
                format::bookings_keyboard(&tickets, ctx.tz),
            )
            .await?;
        }
        Callback::Ticket(ticket_id) => {
            let Some((_, token)) = auth(ctx, telegram_user_id).await? else {
                return prompt_login(bot, chat_id).await;
            };
            let ticket = ctx.api.get_ticket(&token, &ticket_id).await?;
            let (text, keyboard) = format::ticket_detail(&ticket, ctx.tz);
            send_with(bot, chat_id, &text, keyboard).await?;
        }
        Callback::CancelTicket(ticket_id) => {
            let Some((_, token)) = auth(ctx, telegram_user_id).await? else {
                return prompt_login(bot, chat_id).await;
            };
            ctx.api.cancel_ticket(&token, &ticket_id).await?;
            info!(telegram_user_id, ticket_id, "booking cancelled");
            send_with(
                bot,
                chat_id,
                "Booking cancelled.",
                format::main_menu(true),
            )
            .await?;
        }
        Callback::CityMenu => {
            send_with(bot, chat_id, "Pick a city:", format::city_keyboard()).await?;
        }
        Callback::City(city) => {
            send_with(
                bot,
                chat_id,
                &format!("Pick a day in {}:", city.label()),
                format::day_keyboard(city),
            )
            .await?;
        }
        Callback::Day(city, weekday) => {
            browse_day(bot, chat_id, ctx, city, weekday).await?;
        }
        Callback::Book(event_id) => {
            let Some((user, token)) = auth(ctx, telegram_user_id).await? else {
                return prompt_login(bot, chat_id).await;
            };
            match ctx
                .api
                .create_ticket(&token, &event_id, &user.provider_user_id)
                .await
            {
                Ok(_) => {
                    send_with(bot, chat_id, "You're in! 🎟️", format::main_menu(true)).await?;
                }
                Err(e) if e.is_duplicate() => {
                    send_with(
                        bot,
                        chat_id,
                        "You're already booked for this class.",
                        format::main_menu(true),
                    )
                    .await?;
                }
                Err(e) => return Err(e),
            }
        }
        Callback::Series(event_id) => {
            let Some((user, token)) = auth(ctx, telegram_user_id).await? else {
                return prompt_login(bot, chat_id).await;
            };
            book_series(bot, chat_id, ctx, &user, &token, &event_id).await?;
        }
        Callback::Watch(event_id) => {
            let Some((user, _)) = auth(ctx, telegram_user_id).await? else {
                return prompt_login(bot, chat_id).await;
            };
            let created = autojoins::create_autojoin(
                &ctx.db,
                &NewAutoJoin {
                    user_id: user.id,
                    telegram_user_id: telegram_user_id.to_string(),
                    ticket_id: None,
                    event_id,
                },
            )
            .await?;
            let text = if created {
                "You're on the watch list. We'll grab a spot the moment one frees up."
            } else {
                "Already watching this class."
            };
            send_with(bot, chat_id, text, format::main_menu(true)).await?;
        }
        Callback::Subscriptions => {
            if !is_logged_in(ctx, telegram_user_id).await {
                return prompt_login(bot, chat_id).await;
            }
            let subs =
                subscriptions::list_subscriptions_for_user(&ctx.db, telegram_user_id).await?;
            let text = if subs.is_empty() {
                "No weekly subscriptions yet."
            } else {
                "Your weekly subscriptions (tap to remove):"
            };
            send_with(bot, chat_id, text, format::subscriptions_keyboard(&subs)).await?;
        }
        Callback::Unsubscribe(id) => {
            let removed =
                subscriptions::delete_subscription(&ctx.db, id, telegram_user_id).await?;
            let text = if removed {
                "Subscription removed."
            } else {
                "That subscription is already gone."
            };
            let subs =
                subscriptions::list_subscriptions_for_user(&ctx.db, telegram_user_id).await?;
            send_with(bot, chat_id, text, format::subscriptions_keyboard(&subs)).await?;
        }
    }
    Ok(())
}

/// List bookable classes in `city` on the next occurrence of `weekday`.
async fn browse_day(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &BotContext,
    city: City,
    weekday: Weekday,
) -> Result<(), BeatbotError> {
    let date = resolver::next_occurrence(weekday, Utc::now().date_naive());
    let from = date
        .and_hms_opt(0, 0, 0)
        .map(|n| n.and_utc())
        .ok_or_else(|| BeatbotError::Internal(format!("invalid date {date}")))?;
    let to = from + chrono::Duration::days(1);

    let events: Vec<_> = ctx
        .api
        .list_events(city, from, to, 200)
        .await?
        .into_iter()
        .filter(|e| e.is_bookable())
        .collect();

    if events.is_empty() {
        send_with(
            bot,
            chat_id,
            &format!("No classes in {} on {weekday} {date}.", city.label()),
            format::day_keyboard(city),
        )
        .await?;
    } else {
        send_with(
            bot,
            chat_id,
            &format!("Classes in {} on {weekday} {date}:", city.label()),
            format::events_keyboard(&events, ctx.tz),
        )
        .await?;
    }
    Ok(())
}

/// Save a weekly subscription derived from `event_id` and book its chain.
async fn book_series(
    bot: &Bot,
    chat_id: ChatId,
    ctx: &BotContext,
    user: &User,
    token: &str,
    event_id: &str,
) -> Result<(), BeatbotError> {
    let event = ctx.api.get_event(event_id).await?;
    let sub = subscription_for_event(&event, &ctx.tz, user.id, &user.telegram_user_id)?;
    let created = subscriptions::create_subscription(&ctx.db, &sub).await?;

    let booked = ctx
        .engine
        .book_series(token, &user.provider_user_id, &event, Utc::now())
        .await?;

    let text = if created {
        format!("Weekly series saved. Booked {booked} upcoming classes.")
    } else {
        format!("You already have this series. Booked {booked} more classes.")
    };
    send_with(bot, chat_id, &text, format::main_menu(true)).await?;
    Ok(())
}

/// The stored user and their token, when both exist.
async fn auth(
    ctx: &BotContext,
    telegram_user_id: &str,
) -> Result<Option<(User, String)>, BeatbotError> {
    let Some(user) = users::get_user_by_telegram_id(&ctx.db, telegram_user_id).await? else {
        return Ok(None);
    };
    match user.token.clone() {
        Some(token) => Ok(Some((user, token))),
        None => Ok(None),
    }
}

async fn is_logged_in(ctx: &BotContext, telegram_user_id: &str) -> bool {
    matches!(
        users::get_user_by_telegram_id(&ctx.db, telegram_user_id).await,
        Ok(Some(user)) if user.token.is_some()
    )
}

async fn prompt_login(bot: &Bot, chat_id: ChatId) -> Result<(), BeatbotError> {
    send_with(bot, chat_id, format::NOT_LOGGED_IN_TEXT, format::main_menu(false)).await
}

async fn send(bot: &Bot, chat_id: ChatId, text: &str) -> Result<(), BeatbotError> {
    bot.send_message(chat_id, text)
        .await
        .map_err(channel_error)?;
    Ok(())
}

async fn send_with(
    bot: &Bot,
    chat_id: ChatId,
    text: &str,
    keyboard: teloxide::types::InlineKeyboardMarkup,
) -> Result<(), BeatbotError> {
    bot.send_message(chat_id, text)
        .reply_markup(keyboard)
        .await
        .map_err(channel_error)?;
    Ok(())
}

fn channel_error(e: teloxide::RequestError) -> BeatbotError {
    BeatbotError::Channel {
        message: format!("Telegram send failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Derive the weekly slot a user subscribes to from one concrete event,
/// in the display timezone. The stored weekday and `HH:MM` are local so
/// the daily cycle re-resolves the same wall-clock slot across DST.
fn subscription_for_event(
    event: &Event,
    tz: &Tz,
    user_id: i64,
    telegram_user_id: &str,
) -> Result<NewSubscription, BeatbotError> {
    let city = event
        .location
        .city_code
        .as_deref()
        .and_then(|code| code.parse::<City>().ok())
        .ok_or_else(|| BeatbotError::Parse {
            message: format!("event {} has no usable city code", event.id),
        })?;

    let local = event.date_begin.with_timezone(tz);
    Ok(NewSubscription {
        user_id,
        telegram_user_id: telegram_user_id.to_string(),
        location_id: event.location.id.clone(),
        city,
        day_of_week: Weekday::from_chrono(local.weekday()),
        time: local.format("%H:%M").to_string(),
    })
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
