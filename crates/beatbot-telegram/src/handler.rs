// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Callback data grammar for inline keyboard buttons.
//!
//! Every button encodes one [`Callback`]. Entity ids are provider-issued
//! and may themselves contain underscores, so parsing always splits on the
//! first underscore only.

use beatbot_core::types::{City, Weekday};

/// A parsed inline-button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Login,
    MainMenu,
    MyBookings,
    /// Show one booking's details.
    Ticket(String),
    /// Cancel a booking.
    CancelTicket(String),
    /// Pick a city to browse.
    CityMenu,
    /// Pick a weekday within a city.
    City(City),
    /// Browse classes in a city on the next such weekday.
    Day(City, Weekday),
    /// Register for a single event.
    Book(String),
    /// Register for an event and its weekly successors.
    Series(String),
    /// Watch a full event for a freed spot.
    Watch(String),
    /// List the user's subscriptions.
    Subscriptions,
    /// Delete a subscription by row id.
    Unsubscribe(i64),
}

impl Callback {
    /// Parse raw callback data. Unknown or malformed data yields `None`
    /// and is ignored by the dispatcher.
    pub fn parse(data: &str) -> Option<Callback> {
        match data {
            "login" => return Some(Callback::Login),
            "main_menu" => return Some(Callback::MainMenu),
            "my_bookings" => return Some(Callback::MyBookings),
            "city_menu" => return Some(Callback::CityMenu),
            "subs" => return Some(Callback::Subscriptions),
            _ => {}
        }

        let (prefix, rest) = data.split_once('_')?;
        match prefix {
            "ticket" => Some(Callback::Ticket(rest.to_string())),
            "cancel" => Some(Callback::CancelTicket(rest.to_string())),
            "book" => Some(Callback::Book(rest.to_string())),
            "series" => Some(Callback::Series(rest.to_string())),
            "watch" => Some(Callback::Watch(rest.to_string())),
            "unsub" => rest.parse().ok().map(Callback::Unsubscribe),
            "city" => rest.parse().ok().map(Callback::City),
            "day" => {
                let (code, weekday) = rest.split_once('_')?;
                Some(Callback::Day(code.parse().ok()?, weekday.parse().ok()?))
            }
            _ => None,
        }
    }

    /// Encode back into button data. Inverse of [`parse`](Callback::parse).
    pub fn encode(&self) -> String {
        match self {
            Callback::Login => "login".to_string(),
            Callback::MainMenu => "main_menu".to_string(),
            Callback::MyBookings => "my_bookings".to_string(),
            Callback::Ticket(id) => format!("ticket_{id}"),
            Callback::CancelTicket(id) => format!("cancel_{id}"),
            Callback::CityMenu => "city_menu".to_string(),
            Callback::City(city) => format!("city_{city}"),
            Callback::Day(city, weekday) => format!("day_{city}_{weekday}"),
            Callback::Book(id) => format!("book_{id}"),
            Callback::Series(id) => format!("series_{id}"),
            Callback::Watch(id) => format!("watch_{id}"),
            Callback::Subscriptions => "subs".to_string(),
            Callback::Unsubscribe(id) => format!("unsub_{id}"),
        }
    }
}
