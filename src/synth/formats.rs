//! Canonical values for string formats, plus generic filler text.

use std::net::Ipv4Addr;

use chrono::{DateTime, SecondsFormat, Utc};
use fake::faker::internet::en::DomainSuffix;
use fake::faker::lorem::en::Word;
use fake::Fake;
use rand::Rng;

use crate::spec::schema::StringFormat;

/// 2000-01-01T00:00:00Z ..= 2030-01-01T00:00:00Z
const TIMESTAMP_RANGE: std::ops::RangeInclusive<i64> = 946_684_800..=1_893_456_000;

/// A value in the format's canonical textual form, or `None` for
/// formats without a dedicated generator.
pub fn generate<R: Rng + ?Sized>(format: &StringFormat, rng: &mut R) -> Option<String> {
    let value = match format {
        StringFormat::DateTime => timestamp(rng).to_rfc3339_opts(SecondsFormat::Secs, false),
        StringFormat::Date => timestamp(rng).format("%Y-%m-%d").to_string(),
        StringFormat::Email => email(rng),
        StringFormat::Uri => format!("https://{}/{}", hostname(rng), word(rng)),
        StringFormat::Uuid => uuid::Builder::from_random_bytes(rng.gen())
            .into_uuid()
            .to_string(),
        StringFormat::Hostname => hostname(rng),
        StringFormat::Ipv4 => Ipv4Addr::from(rng.gen::<u32>()).to_string(),
        StringFormat::Ipv6 => ipv6(rng),
        StringFormat::Other(_) => return None,
    };
    Some(value)
}

/// Human-readable filler whose length (in chars) lies in `[min_len, max_len]`.
pub fn text<R: Rng + ?Sized>(rng: &mut R, min_len: usize, max_len: usize) -> String {
    let max_len = max_len.max(min_len);
    let target = rng.gen_range(min_len..=max_len);
    if target == 0 {
        return String::new();
    }

    let mut words = String::with_capacity(target + 16);
    let mut len = 0;
    while len < target {
        if !words.is_empty() {
            words.push(' ');
            len += 1;
        }
        let next = word(rng);
        let next = if next.is_empty() { "lorem" } else { next.as_str() };
        words.push_str(next);
        len += next.chars().count();
    }

    let mut out: String = words.chars().take(target).collect();
    if out.ends_with(' ') {
        out.pop();
        out.push('s');
    }
    if let Some(first) = out.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    out
}

fn timestamp<R: Rng + ?Sized>(rng: &mut R) -> DateTime<Utc> {
    let secs = rng.gen_range(TIMESTAMP_RANGE);
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}

fn word<R: Rng + ?Sized>(rng: &mut R) -> String {
    let word: String = Word().fake_with_rng(rng);
    word.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

fn hostname<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = DomainSuffix().fake_with_rng(rng);
    let suffix = if suffix.len() >= 2 && suffix.chars().all(|c| c.is_ascii_alphabetic()) {
        suffix
    } else {
        "com".to_string()
    };
    let label = word(rng);
    let label = if label.is_empty() { "example".to_string() } else { label };
    format!("{}.{}", label, suffix)
}

fn email<R: Rng + ?Sized>(rng: &mut R) -> String {
    let user = word(rng);
    let user = if user.is_empty() { "user".to_string() } else { user };
    format!("{}.{}@{}", user, rng.gen_range(1..1000), hostname(rng))
}

/// Full eight-group form; never compressed with `::`.
fn ipv6<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..8)
        .map(|_| format!("{:x}", rng.gen::<u16>()))
        .collect::<Vec<_>>()
        .join(":")
}
