//! Channel reference parsing and resolution
//!
//! Users identify a channel in several ways: a canonical `/channel/UC...`
//! URL, a legacy `/user/<name>` or `/c/<name>` URL, an `@handle` URL, or the
//! bare ID or handle. [`ChannelReference::parse`] normalizes all of them and
//! [`resolve_channel`] turns the result into a [`ChannelId`].

use crate::api::{ChannelLookup, YouTubeApi, operation};
use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::retry::RetryGovernor;
use crate::types::ChannelId;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Canonical channel ID: "UC" followed by 22 URL-safe base64 characters
#[allow(clippy::expect_used)]
static CHANNEL_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^UC[0-9A-Za-z_-]{22}$").expect("Invalid channel ID regex pattern")
});

/// Handle body (without the leading '@'); handles may use any script
#[allow(clippy::expect_used)]
static HANDLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.·-]{1,100}$").expect("Invalid handle regex pattern")
});

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "m.youtube.com"];

/// A parsed, not yet resolved, channel reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelReference {
    /// Canonical channel ID; resolves without a network call
    Id(ChannelId),
    /// Legacy `/user/` or `/c/` name
    Legacy(String),
    /// `@handle`, stored without the '@'
    Handle(String),
}

impl ChannelReference {
    /// Parse a URL or bare ID/handle
    ///
    /// # Errors
    /// Returns [`Error::InvalidReference`] for anything that is not one of
    /// the supported shapes.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::InvalidReference("reference is empty".into()));
        }

        if CHANNEL_ID_REGEX.is_match(input) {
            return Ok(ChannelReference::Id(ChannelId::from(input)));
        }
        if let Some(handle) = input.strip_prefix('@') {
            return parse_handle(handle, input);
        }

        let with_scheme = if input.contains("://") {
            input.to_string()
        } else {
            format!("https://{}", input)
        };
        let url = url::Url::parse(&with_scheme)
            .map_err(|_| Error::InvalidReference(input.to_string()))?;

        let host = url.host_str().unwrap_or_default();
        if !YOUTUBE_HOSTS.contains(&host) {
            return Err(Error::InvalidReference(format!(
                "{} is not a YouTube URL",
                input
            )));
        }

        // The url crate percent-encodes non-ASCII path characters
        let segments = url
            .path_segments()
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .take(2)
            .map(|s| {
                urlencoding::decode(s)
                    .map(|decoded| decoded.into_owned())
                    .map_err(|_| Error::InvalidReference(format!("{} is not valid UTF-8", input)))
            })
            .collect::<Result<Vec<String>>>()?;

        match segments.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["channel", id, ..] if CHANNEL_ID_REGEX.is_match(id) => {
                Ok(ChannelReference::Id(ChannelId::from(*id)))
            }
            ["user" | "c", name, ..] => Ok(ChannelReference::Legacy(name.to_string())),
            [first, ..] if first.starts_with('@') => parse_handle(&first[1..], input),
            _ => Err(Error::InvalidReference(format!(
                "{} does not point at a channel",
                input
            ))),
        }
    }
}

fn parse_handle(handle: &str, input: &str) -> Result<ChannelReference> {
    if HANDLE_REGEX.is_match(handle) {
        Ok(ChannelReference::Handle(handle.to_string()))
    } else {
        Err(Error::InvalidReference(format!("{} is not a valid handle", input)))
    }
}

impl std::fmt::Display for ChannelReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelReference::Id(id) => write!(f, "channel {}", id),
            ChannelReference::Legacy(name) => write!(f, "legacy name {}", name),
            ChannelReference::Handle(handle) => write!(f, "@{}", handle),
        }
    }
}

impl std::str::FromStr for ChannelReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Resolve a parsed reference to its canonical channel ID
///
/// `Id` references return immediately. Legacy names go through the
/// username lookup and, when `config.search_fallback` is set, a top-1
/// channel search if the lookup finds nothing. Handles use the handle lookup.
///
/// # Errors
/// - [`Error::ChannelNotFound`] when nothing matches
/// - [`Error::AmbiguousReference`] when a lookup returns several channels
/// - [`Error::TransientApi`] / [`Error::FatalApi`] from the remote calls
pub async fn resolve_channel(
    api: &dyn YouTubeApi,
    governor: &RetryGovernor,
    reference: &ChannelReference,
    config: &ResolverConfig,
) -> Result<ChannelId> {
    match reference {
        ChannelReference::Id(id) => {
            debug!(channel_id = %id, "reference is already a channel ID");
            Ok(id.clone())
        }
        ChannelReference::Legacy(name) => {
            let lookup = ChannelLookup::ByUsername(name.clone());
            match lookup_single(api, governor, &lookup, reference).await? {
                Some(id) => Ok(id),
                None if config.search_fallback => search_top_hit(api, governor, name).await,
                None => Err(Error::ChannelNotFound(reference.to_string())),
            }
        }
        ChannelReference::Handle(handle) => {
            let lookup = ChannelLookup::ByHandle(format!("@{}", handle));
            lookup_single(api, governor, &lookup, reference)
                .await?
                .ok_or_else(|| Error::ChannelNotFound(reference.to_string()))
        }
    }
}

/// Run a direct lookup expecting zero or one channel
async fn lookup_single(
    api: &dyn YouTubeApi,
    governor: &RetryGovernor,
    lookup: &ChannelLookup,
    reference: &ChannelReference,
) -> Result<Option<ChannelId>> {
    let channels = governor
        .call(operation::CHANNELS_LIST, || api.list_channels(lookup))
        .await?;

    match channels.as_slice() {
        [] => Ok(None),
        [channel] => {
            let id = ChannelId::from(channel.id.as_str());
            info!(reference = %reference, channel_id = %id, "resolved channel reference");
            Ok(Some(id))
        }
        many => Err(Error::AmbiguousReference {
            reference: reference.to_string(),
            matches: many.len(),
        }),
    }
}

async fn search_top_hit(
    api: &dyn YouTubeApi,
    governor: &RetryGovernor,
    name: &str,
) -> Result<ChannelId> {
    let hits = governor
        .call(operation::SEARCH_LIST, || api.search_channels(name, 1))
        .await?;

    match hits.into_iter().next() {
        Some(hit) => {
            warn!(
                legacy_name = name,
                channel_id = %hit.channel_id,
                title = %hit.title,
                "legacy name is not a username; using top search result"
            );
            Ok(hit.channel_id)
        }
        None => Err(Error::ChannelNotFound(format!("legacy name {}", name))),
    }
}
