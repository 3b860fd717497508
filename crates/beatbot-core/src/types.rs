// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the beatbot workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Cities the booking provider operates in.
///
/// A closed set: the serialized form is the provider's `location_city_code`
/// value, the [`label`](City::label) is what users see in menus.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum City {
    Berlin,
    Munich,
    Hamburg,
    Cologne,
    Duesseldorf,
    Frankfurt,
}

impl City {
    /// Provider city code used in API query parameters and storage.
    pub fn code(&self) -> &'static str {
        match self {
            City::Berlin => "berlin",
            City::Munich => "munich",
            City::Hamburg => "hamburg",
            City::Cologne => "cologne",
            City::Duesseldorf => "duesseldorf",
            City::Frankfurt => "frankfurt",
        }
    }

    /// Human-readable display label.
    pub fn label(&self) -> &'static str {
        match self {
            City::Berlin => "Berlin",
            City::Munich => "Munich",
            City::Hamburg => "Hamburg",
            City::Cologne => "Cologne",
            City::Duesseldorf => "Düsseldorf",
            City::Frankfurt => "Frankfurt",
        }
    }
}

/// Days of the week for recurring subscriptions.
///
/// Stored by name in the subscriptions table; converts to [`chrono::Weekday`]
/// for calendar arithmetic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }

    pub fn from_chrono(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// A scheduled class instance, as returned by the provider.
///
/// Read-only from our side. The engine only trusts events that are
/// published and not cancelled; [`is_bookable`](Event::is_bookable)
/// checks both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub date_begin: DateTime<Utc>,
    pub location: EventLocation,
    #[serde(default)]
    pub max_participants: u32,
    #[serde(default)]
    pub participants_count: u32,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub status: Option<String>,
}

impl Event {
    pub fn is_bookable(&self) -> bool {
        self.is_published && self.status.as_deref() != Some("cancelled")
    }

    pub fn is_full(&self) -> bool {
        self.max_participants > 0 && self.participants_count >= self.max_participants
    }
}

/// Location details embedded in an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLocation {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city_code: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Street address of a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub zip: String,
}

/// A user's booking against an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub event: Option<Event>,
}

/// The result of a successful provider login: the bearer token plus the
/// identity fields read from the JWT payload (unverified, trusts the issuer).
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub provider_user_id: String,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
}
