//! Coarse region keys derived from Taiwanese street addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionKey {
    /// City plus district, e.g. `高雄市前鎮區` or `屏東縣潮州鎮`.
    District(String),
    /// First three digits of a leading postal code.
    Postal(String),
    Unassigned,
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKey::District(name) => f.write_str(name),
            RegionKey::Postal(prefix) => write!(f, "postal {prefix}"),
            RegionKey::Unassigned => f.write_str("unassigned"),
        }
    }
}

/// Characters of the city name kept in front of the city marker.
const CITY_NAME_CHARS: usize = 2;

pub fn region_key(address: &str) -> RegionKey {
    if let Some(district) = district(address) {
        return RegionKey::District(district);
    }
    if let Some(prefix) = postal_prefix(address) {
        return RegionKey::Postal(prefix);
    }
    RegionKey::Unassigned
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn district_suffixes(marker: char) -> &'static [char] {
    match marker {
        '市' => &['區'],
        '縣' => &['鄉', '鎮', '市'],
        _ => &[],
    }
}

fn district(address: &str) -> Option<String> {
    let chars: Vec<char> = address.chars().collect();

    for (marker_at, &marker) in chars.iter().enumerate() {
        let suffixes = district_suffixes(marker);
        if suffixes.is_empty() || marker_at == 0 {
            continue;
        }

        let city_start = chars[..marker_at]
            .iter()
            .rev()
            .take(CITY_NAME_CHARS)
            .take_while(|c| is_word(**c) && !c.is_ascii_digit())
            .count();
        if city_start == 0 {
            continue;
        }

        let run = chars[marker_at + 1..]
            .iter()
            .take_while(|c| is_word(**c))
            .count();
        let tail = &chars[marker_at + 1..marker_at + 1 + run];
        let Some(suffix_at) = tail
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, c)| suffixes.contains(*c))
            .map(|(at, _)| at)
        else {
            continue;
        };

        let key: String = chars[marker_at - city_start..=marker_at + 1 + suffix_at]
            .iter()
            .collect();
        return Some(key);
    }
    None
}

fn postal_prefix(address: &str) -> Option<String> {
    let prefix: String = address.trim_start().chars().take(3).collect();
    (prefix.chars().count() == 3 && prefix.chars().all(|c| c.is_ascii_digit())).then_some(prefix)
}
