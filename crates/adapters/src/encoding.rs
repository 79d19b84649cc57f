// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stdout charset resolution and decoding.
//!
//! Resolution order: explicit label, sniffed encoding, configured default,
//! then UTF-8.

use encoding_rs::{Encoding, UTF_8};

/// Inputs to charset resolution for one command's stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingPolicy<'a> {
    /// Label the caller asked for explicitly.
    pub explicit: Option<&'a str>,
    /// Whether to sniff the bytes when no explicit label is given.
    pub detect: bool,
    /// Configured fallback label.
    pub default: Option<&'a str>,
}

/// Pick the encoding for `bytes` under `policy`.
pub fn resolve(bytes: &[u8], policy: EncodingPolicy<'_>) -> &'static Encoding {
    if let Some(label) = policy.explicit {
        match lookup(label) {
            Some(encoding) => return encoding,
            None => tracing::warn!(label, "unsupported explicit encoding, ignoring"),
        }
    }

    if policy.detect {
        if let Some(encoding) = sniff(bytes) {
            return encoding;
        }
    }

    match policy.default {
        Some(label) => lookup(label).unwrap_or_else(|| {
            tracing::warn!(label, "unsupported default encoding, using utf-8");
            UTF_8
        }),
        None => UTF_8,
    }
}

/// Decode `bytes`, dropping a leading BOM that matches the encoding.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, had_errors) = encoding.decode_with_bom_removal(bytes);
    if had_errors {
        tracing::debug!(encoding = encoding.name(), "stdout contained undecodable bytes");
    }
    text.into_owned()
}

/// Guess the encoding of `bytes`.
///
/// Returns `None` when the bytes carry no signal (empty or pure ASCII) or the
/// detector's guess is unconvincing, so the configured default gets a say.
pub fn sniff(bytes: &[u8]) -> Option<&'static Encoding> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return Some(encoding);
    }
    if bytes.is_ascii() {
        return None;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return Some(UTF_8);
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let (guess, confident) = detector.guess_assess(None, false);
    assessed(bytes, guess, confident)
}

/// Keep a detector guess only if it was confident and decodes `bytes` cleanly.
fn assessed(bytes: &[u8], guess: &'static Encoding, confident: bool) -> Option<&'static Encoding> {
    if !confident {
        tracing::debug!(guess = guess.name(), "low-confidence encoding guess, deferring to default");
        return None;
    }
    if guess.decode_without_bom_handling_and_without_replacement(bytes).is_none() {
        tracing::debug!(guess = guess.name(), "guessed encoding does not fit, deferring to default");
        return None;
    }
    Some(guess)
}

fn lookup(label: &str) -> Option<&'static Encoding> {
    // Accept the common "utf8"/"utf16le" spellings alongside WHATWG labels
    Encoding::for_label(label.as_bytes()).or_else(|| match label.to_ascii_lowercase().as_str() {
        "utf8" => Some(UTF_8),
        "utf16le" => Some(encoding_rs::UTF_16LE),
        "utf16be" => Some(encoding_rs::UTF_16BE),
        _ => None,
    })
}

#[cfg(test)]
#[path = "encoding_tests.rs"]
mod tests;
