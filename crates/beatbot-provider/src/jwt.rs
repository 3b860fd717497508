// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unverified JWT payload extraction.
//!
//! The provider issues the access token over the same TLS channel we just
//! authenticated on, so the payload is decoded without signature
//! verification. The token is never minted or validated locally.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use beatbot_core::BeatbotError;
use serde::Deserialize;

/// Identity fields the provider embeds in the token payload.
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub email: String,
}

/// Decode the payload segment of a JWT without verifying its signature.
pub fn decode_claims(token: &str) -> Result<TokenClaims, BeatbotError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature)) => payload,
        _ => {
            return Err(BeatbotError::Parse {
                message: "access token is not a three-segment JWT".to_string(),
            });
        }
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| BeatbotError::Parse {
            message: format!("JWT payload is not valid base64url: {e}"),
        })?;

    serde_json::from_slice(&bytes).map_err(|e| BeatbotError::Parse {
        message: format!("JWT payload is not the expected JSON shape: {e}"),
    })
}
