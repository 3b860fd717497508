// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message texts and inline keyboards.
//!
//! All user-visible strings live here so the dispatch code stays free of
//! formatting concerns. Times render in the configured display timezone.

use beatbot_core::types::{City, Event, Ticket, Weekday};
use beatbot_recurrence::resolver;
use beatbot_storage::models::Subscription;
use chrono_tz::Tz;
use strum::IntoEnumIterator;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::handler::Callback;

pub const MENU_TEXT: &str = "Choose an option below:";
pub const FAILURE_TEXT: &str = "Something went wrong, please try again later.";
pub const SESSION_EXPIRED_TEXT: &str = "Your session expired. Please log in again.";
pub const ASK_EMAIL_TEXT: &str = "Please enter your email:";
pub const ASK_PASSWORD_TEXT: &str = "Got it! Now enter your password:";
pub const LOGIN_OK_TEXT: &str = "Login successful! 🎉";
pub const LOGIN_FAILED_TEXT: &str = "Login failed. Please try again.";
pub const NOT_LOGGED_IN_TEXT: &str = "Please log in first.";

fn button(label: impl Into<String>, callback: Callback) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label.into(), callback.encode())
}

fn back_row(target: Callback) -> Vec<InlineKeyboardButton> {
    vec![button("Back", target)]
}

/// The main menu: login only for unknown users, the full set otherwise.
pub fn main_menu(logged_in: bool) -> InlineKeyboardMarkup {
    let rows = if logged_in {
        vec![
            vec![button("My bookings", Callback::MyBookings)],
            vec![button("Browse classes", Callback::CityMenu)],
            vec![button("My subscriptions", Callback::Subscriptions)],
        ]
    } else {
        vec![vec![button("Login", Callback::Login)]]
    };
    InlineKeyboardMarkup::new(rows)
}

/// One button per upcoming booking, labelled `location - time`.
pub fn bookings_keyboard(tickets: &[Ticket], tz: Tz) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = tickets
        .iter()
        .map(|ticket| {
            let label = match &ticket.event {
                Some(event) => format!(
                    "{} - {}",
                    event.location.name,
                    resolver::format_short(event.date_begin, tz)
                ),
                None => format!("Booking {}", ticket.id),
            };
            vec![button(label, Callback::Ticket(ticket.id.clone()))]
        })
        .collect();
    rows.push(back_row(Callback::MainMenu));
    InlineKeyboardMarkup::new(rows)
}

/// Detail text and actions for a single booking.
pub fn ticket_detail(ticket: &Ticket, tz: Tz) -> (String, InlineKeyboardMarkup) {
    let text = match &ticket.event {
        Some(event) => {
            let address = event
                .location
                .address
                .as_ref()
                .map(|a| format!("{}, {}", a.address1, a.zip))
                .unwrap_or_default();
            format!(
                "Participants: {}/{}\nPlace: {}\nAddress: {address}\nDate: {}",
                event.participants_count,
                event.max_participants,
                event.location.name,
                resolver::format_long(event.date_begin, tz),
            )
        }
        None => format!("Booking {}", ticket.id),
    };
    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![button("Cancel", Callback::CancelTicket(ticket.id.clone()))],
        back_row(Callback::MyBookings),
    ]);
    (text, keyboard)
}

/// One button per supported city.
pub fn city_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = City::iter()
        .map(|city| vec![button(city.label(), Callback::City(city))])
        .collect();
    rows.push(back_row(Callback::MainMenu));
    InlineKeyboardMarkup::new(rows)
}

/// One button per weekday within a city.
pub fn day_keyboard(city: City) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Weekday::iter()
        .map(|day| vec![button(day.to_string(), Callback::Day(city, day))])
        .collect();
    rows.push(back_row(Callback::CityMenu));
    InlineKeyboardMarkup::new(rows)
}

/// Per event: book it, book the weekly series, or watch for a free spot.
pub fn events_keyboard(events: &[Event], tz: Tz) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = events
        .iter()
        .map(|event| {
            let label = format!(
                "{} {} ({}/{})",
                event.location.name,
                resolver::format_short(event.date_begin, tz),
                event.participants_count,
                event.max_participants,
            );
            vec![
                button(label, Callback::Book(event.id.clone())),
                button("Weekly", Callback::Series(event.id.clone())),
                button("Watch", Callback::Watch(event.id.clone())),
            ]
        })
        .collect();
    rows.push(back_row(Callback::CityMenu));
    InlineKeyboardMarkup::new(rows)
}

/// One button per subscription; pressing it unsubscribes.
pub fn subscriptions_keyboard(subs: &[Subscription]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = subs
        .iter()
        .map(|sub| {
            let label = format!("{} {} {} ✕", sub.city.label(), sub.day_of_week, sub.time);
            vec![button(label, Callback::Unsubscribe(sub.id))]
        })
        .collect();
    rows.push(back_row(Callback::MainMenu));
    InlineKeyboardMarkup::new(rows)
}
