//! Candidate stream validation.
//!
//! A scraped URL is only trusted after a cheap network probe: HEAD for
//! the declared content type, then a 1 KiB partial GET sniffing playlist
//! magic when HEAD is rejected or inconclusive. The probe has its own
//! short timeout, independent of the per-source budget, because it runs
//! many times per extraction.

use std::time::Duration;

use tracing::debug;

use crate::extract::urls::{has_playlist_magic, has_playlist_marker, is_playlist_mime, is_plausible_url};
use crate::fetch::EmbedClient;

/// How much body we read when sniffing playlist magic.
const SNIFF_BYTES: usize = 1024;

/// Lightweight stream-URL validator.
#[derive(Debug, Clone)]
pub struct Validator {
    client: EmbedClient,
    timeout: Duration,
}

impl Validator {
    pub fn new(client: EmbedClient, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Is this URL plausibly a working playlist stream?
    ///
    /// Never errors; any network fault is a `false`.
    pub async fn validate(&self, url: &str) -> bool {
        if !is_plausible_url(url) || !has_playlist_marker(url) {
            return false;
        }

        // HEAD first: cheapest possible confirmation.
        match self.client.head(url, self.timeout).await {
            Ok((status, Some(content_type))) if status.is_success() => {
                if is_playlist_mime(&content_type) {
                    debug!(url, %content_type, "validated via HEAD");
                    return true;
                }
                // 200 with the wrong type is inconclusive; fall through
                // and sniff the body.
            }
            Ok(_) => {}
            Err(err) => {
                debug!(url, %err, "HEAD probe failed");
            }
        }

        match self.client.fetch_prefix(url, SNIFF_BYTES, self.timeout).await {
            Ok(prefix) => {
                let ok = has_playlist_magic(&prefix);
                debug!(url, validated = ok, "sniffed body prefix");
                ok
            }
            Err(err) => {
                debug!(url, %err, "partial GET failed");
                false
            }
        }
    }
}
