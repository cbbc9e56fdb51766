//! Site families and URL shapes
//!
//! Every URL is classified before anything is fetched, so a wrong domain or a
//! page of the wrong kind never costs a network call.

use page_fetcher::WaitFor;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::error::{Result, ScrapeError};

const BBREF_HOSTS: [&str; 2] = ["www.baseball-reference.com", "baseball-reference.com"];
const BBREF_BASE: &str = "https://www.baseball-reference.com";
const SAVANT_HOST: &str = "baseballsavant.mlb.com";
const SAVANT_BASE: &str = "https://baseballsavant.mlb.com";

/// Savant fills its tables in by script; this element appears once it has
const SAVANT_READY_SELECTOR: &str = "#detailedPitches";

/// The page families statistics are scraped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    /// `https://www.baseball-reference.com/players/a/aaronha01.shtml`
    BaseballReferencePlayer,
    /// `https://www.baseball-reference.com/teams/CLE/2017.shtml`
    BaseballReferenceTeam,
    /// `https://baseballsavant.mlb.com/savant-player/jose-ramirez-608070`
    SavantPlayer,
}

impl Site {
    /// Work out which page family `url` belongs to
    pub fn classify(url: &str) -> Result<Self> {
        let parsed = parse_http_url(url)?;
        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        if BBREF_HOSTS.contains(&host.as_str()) {
            return match segments.as_slice() {
                ["players", letter, page] if is_player_page(letter, page) => {
                    Ok(Self::BaseballReferencePlayer)
                }
                ["teams", team, page] if is_team_page(team, page) => Ok(Self::BaseballReferenceTeam),
                _ => Err(ScrapeError::invalid_url(
                    url,
                    "not a baseball-reference player or team-season page",
                )),
            };
        }

        if host == SAVANT_HOST {
            return match segments.as_slice() {
                ["savant-player", slug] if is_savant_slug(slug) => Ok(Self::SavantPlayer),
                _ => Err(ScrapeError::invalid_url(url, "not a Baseball Savant player page")),
            };
        }

        Err(ScrapeError::invalid_url(url, format!("unsupported host '{host}'")))
    }

    /// Readiness signal the renderer waits for on this site
    pub fn wait_condition(&self) -> WaitFor {
        match self {
            Self::SavantPlayer => WaitFor::selector(SAVANT_READY_SELECTOR),
            Self::BaseballReferencePlayer | Self::BaseballReferenceTeam => WaitFor::NetworkIdle,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BaseballReferencePlayer => "baseball-reference player page",
            Self::BaseballReferenceTeam => "baseball-reference team page",
            Self::SavantPlayer => "Baseball Savant player page",
        };
        f.write_str(name)
    }
}

/// Parse an absolute http(s) URL
pub fn parse_http_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| ScrapeError::invalid_url(url, format!("not an absolute URL: {e}")))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        scheme => Err(ScrapeError::invalid_url(url, format!("unsupported scheme '{scheme}'"))),
    }
}

/// `players/<l>/<key>.shtml`, where `<l>` is the key's first letter
fn is_player_page(letter: &str, page: &str) -> bool {
    let Some(key) = page.strip_suffix(".shtml") else {
        return false;
    };
    is_bbref_key(key) && letter.len() == 1 && key.starts_with(letter)
}

/// `teams/<TEAM>/<year>.shtml`
fn is_team_page(team: &str, page: &str) -> bool {
    let Some(year) = page.strip_suffix(".shtml") else {
        return false;
    };
    (2..=4).contains(&team.len())
        && team.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
}

/// `<name parts>-<mlbam id>`
fn is_savant_slug(slug: &str) -> bool {
    match slug.rsplit_once('-') {
        Some((name, id)) => {
            !name.is_empty() && !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

fn is_bbref_key(key: &str) -> bool {
    !key.is_empty()
        && key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && key.starts_with(|c: char| c.is_ascii_lowercase())
}

/// baseball-reference profile URL for a player key such as `ramirjo01`
pub fn player_url(bbref_key: &str) -> Result<String> {
    let key = bbref_key.trim().to_ascii_lowercase();
    if !is_bbref_key(&key) {
        return Err(ScrapeError::invalid_url(bbref_key, "not a baseball-reference player key"));
    }
    Ok(format!("{BBREF_BASE}/players/{}/{key}.shtml", &key[..1]))
}

/// baseball-reference team-season URL, e.g. `team_url("CLE", 2017)`
pub fn team_url(team: &str, year: u16) -> Result<String> {
    let team = team.trim().to_ascii_uppercase();
    let page = format!("{year:04}.shtml");
    if !is_team_page(&team, &page) {
        return Err(ScrapeError::invalid_url(team, "not a baseball-reference team code"));
    }
    Ok(format!("{BBREF_BASE}/teams/{team}/{page}"))
}

/// Baseball Savant player URL from a name and MLBAM id
pub fn savant_player_url(last: &str, first: &str, mlbam_id: &str) -> Result<String> {
    let slug_part = |s: &str| s.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase();
    let slug = format!("{}-{}-{}", slug_part(first), slug_part(last), mlbam_id.trim());
    if !is_savant_slug(&slug) || slug_part(first).is_empty() || slug_part(last).is_empty() {
        return Err(ScrapeError::invalid_url(slug, "incomplete Savant player name or id"));
    }
    Ok(format!("{SAVANT_BASE}/savant-player/{slug}"))
}
