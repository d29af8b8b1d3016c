/*
 *  api.rs
 *
 *  PlexRadio - turn it up
 *  (c) 2020-26 Stuart Hunter
 *
 *  Radio API client - channel roster and current song over JSON/HTTP
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use crate::deutils::{deserialize_opt_seconds, deserialize_opt_string, deserialize_string_lenient};

use log::debug;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON deserialization error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("radio API returned status {status:?}: {message}")]
    Status { status: String, message: String },
}

/// One radio channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub name: String,
}

impl Channel {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

/// What a channel is playing right now
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SongInfo {
    #[serde(default, deserialize_with = "deserialize_string_lenient")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_string_lenient")]
    pub artist: String,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub media_link: Option<String>,
    /// Offset into the track the channel is at, in seconds
    #[serde(default, deserialize_with = "deserialize_opt_seconds")]
    pub start_time: Option<f64>,
}

impl SongInfo {
    /// "Artist - Title", or whichever half is known
    pub fn display_title(&self) -> String {
        match (self.artist.is_empty(), self.title.is_empty()) {
            (false, false) => format!("{} - {}", self.artist, self.title),
            (true, false) => self.title.clone(),
            (false, true) => self.artist.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: Option<String>,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

#[derive(Debug, Deserialize)]
struct RawChannel {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    name: Option<String>,
}

/// Decode a `/channels` body; unnamed channels are called "Channel N"
pub fn parse_channels(body: &str) -> Result<Vec<Channel>, ApiError> {
    let envelope: Envelope<Vec<RawChannel>> = serde_json::from_str(body)?;
    if !envelope.is_success() {
        return Err(ApiError::Status {
            status: envelope.status.unwrap_or_default(),
            message: envelope.message.unwrap_or_default(),
        });
    }
    Ok(envelope
        .data
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, raw)| Channel {
            name: raw.name.unwrap_or_else(|| format!("Channel {}", i)),
        })
        .collect())
}

/// Decode a `/current-song/{index}` body; a non-success status means nothing is on
pub fn parse_song(body: &str) -> Result<Option<SongInfo>, ApiError> {
    let envelope: Envelope<SongInfo> = serde_json::from_str(body)?;
    if !envelope.is_success() {
        debug!("No current song: {:?} {:?}", envelope.status, envelope.message);
        return Ok(None);
    }
    Ok(envelope.data)
}

/// Source of roster and now-playing metadata
pub trait RadioApi: Send + Sync {
    fn channels(&self) -> impl Future<Output = Result<Vec<Channel>, ApiError>> + Send;

    fn current_song(
        &self,
        channel_index: usize,
    ) -> impl Future<Output = Result<Option<SongInfo>, ApiError>> + Send;
}

/// A client for the remote radio service
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Creates a new `ApiClient` inclusive populated headers and timeouts.
    pub fn new(base_url: &str, timeout: Duration, connect_timeout: Duration) -> Result<Self, ApiError> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T, F>(&self, path: &str, parse: F) -> Result<T, ApiError>
    where
        F: FnOnce(&str) -> Result<T, ApiError>,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        // Check for HTTP status code
        response.error_for_status_ref()?;
        let body = response.text().await?;
        parse(&body)
    }
}

impl RadioApi for ApiClient {
    async fn channels(&self) -> Result<Vec<Channel>, ApiError> {
        let channels = self.get("/channels", parse_channels).await?;
        debug!("Loaded {} channels", channels.len());
        Ok(channels)
    }

    async fn current_song(&self, channel_index: usize) -> Result<Option<SongInfo>, ApiError> {
        self.get(&format!("/current-song/{}", channel_index), parse_song).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channels() {
        let body = r#"{"status":"success","data":[{"name":"Jazz"},{"name":"Rock"},{}]}"#;
        let channels = parse_channels(body).unwrap();
        assert_eq!(
            channels,
            vec![Channel::new("Jazz"), Channel::new("Rock"), Channel::new("Channel 2")]
        );
    }

    #[test]
    fn test_parse_channels_error_status() {
        let body = r#"{"status":"error","message":"library offline"}"#;
        match parse_channels(body) {
            Err(ApiError::Status { status, message }) => {
                assert_eq!(status, "error");
                assert_eq!(message, "library offline");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_channels_empty_roster() {
        assert!(parse_channels(r#"{"status":"success","data":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_song() {
        let body = r#"{"status":"success","data":{"title":"So What","artist":"Miles Davis",
            "media_link":"http://plex/library/1.mp3","start_time":"42.5"}}"#;
        let song = parse_song(body).unwrap().unwrap();
        assert_eq!(song.display_title(), "Miles Davis - So What");
        assert_eq!(song.media_link.as_deref(), Some("http://plex/library/1.mp3"));
        assert_eq!(song.start_time, Some(42.5));
    }

    #[test]
    fn test_parse_song_non_success_is_none() {
        assert_eq!(parse_song(r#"{"status":"error"}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_song_success_without_data() {
        assert_eq!(parse_song(r#"{"status":"success"}"#).unwrap(), None);
        assert_eq!(parse_song(r#"{"status":"success","data":null}"#).unwrap(), None);
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        assert!(matches!(parse_song("<html>"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_display_title_partial() {
        let song = SongInfo {
            title: "Untitled".into(),
            artist: String::new(),
            media_link: None,
            start_time: None,
        };
        assert_eq!(song.display_title(), "Untitled");
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = ApiClient::new("http://radio:5000/", Duration::from_secs(5), Duration::from_secs(2)).unwrap();
        assert_eq!(client.base_url(), "http://radio:5000");
    }
}
