//! The statistics tables this crate knows how to find

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScrapeError;
use crate::extract::TableSpec;
use crate::locator::TableLocator;
use crate::site::Site;

/// A statistics table on one of the supported sites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatCategory {
    PlayerBatting,
    PlayerPitching,
    TeamBatting,
    TeamPitching,
    SavantPercentiles,
    SavantStatcastPitching,
    SavantStatcastBatting,
    SavantBattedBallProfile,
    SavantPitchTracking,
}

impl StatCategory {
    pub const ALL: [StatCategory; 9] = [
        Self::PlayerBatting,
        Self::PlayerPitching,
        Self::TeamBatting,
        Self::TeamPitching,
        Self::SavantPercentiles,
        Self::SavantStatcastPitching,
        Self::SavantStatcastBatting,
        Self::SavantBattedBallProfile,
        Self::SavantPitchTracking,
    ];

    /// The page family the table lives on
    pub fn site(&self) -> Site {
        match self {
            Self::PlayerBatting | Self::PlayerPitching => Site::BaseballReferencePlayer,
            Self::TeamBatting | Self::TeamPitching => Site::BaseballReferenceTeam,
            Self::SavantPercentiles
            | Self::SavantStatcastPitching
            | Self::SavantStatcastBatting
            | Self::SavantBattedBallProfile
            | Self::SavantPitchTracking => Site::SavantPlayer,
        }
    }

    /// Every category found on pages of `site`
    pub fn for_site(site: Site) -> Vec<StatCategory> {
        Self::ALL.into_iter().filter(|c| c.site() == site).collect()
    }

    /// Where the table is and how to read it
    pub fn table_spec(&self) -> TableSpec {
        match self {
            Self::PlayerBatting => TableSpec::new(TableLocator::table("batting_standard")),
            Self::PlayerPitching => TableSpec::new(TableLocator::table("pitching_standard")),
            Self::TeamBatting => TableSpec::new(TableLocator::table("team_batting")),
            Self::TeamPitching => TableSpec::new(TableLocator::table("team_pitching")),
            Self::SavantPercentiles => TableSpec::new(TableLocator::table("percentileRankings")),
            // Last row of the statcast tables is the MLB average
            Self::SavantStatcastPitching => {
                TableSpec::new(TableLocator::first_table_in("statcast_stats_pitching"))
                    .dropping_trailing(1)
            }
            Self::SavantStatcastBatting => {
                TableSpec::new(TableLocator::first_table_in("statcast_glance_batter"))
                    .dropping_trailing(1)
            }
            Self::SavantBattedBallProfile => TableSpec::new(TableLocator::table("playeDiscipline")),
            Self::SavantPitchTracking => {
                TableSpec::new(TableLocator::first_table_in("pitchingBreakdown"))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayerBatting => "player-batting",
            Self::PlayerPitching => "player-pitching",
            Self::TeamBatting => "team-batting",
            Self::TeamPitching => "team-pitching",
            Self::SavantPercentiles => "savant-percentiles",
            Self::SavantStatcastPitching => "savant-statcast-pitching",
            Self::SavantStatcastBatting => "savant-statcast-batting",
            Self::SavantBattedBallProfile => "savant-batted-ball-profile",
            Self::SavantPitchTracking => "savant-pitch-tracking",
        }
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatCategory {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ScrapeError::Config(format!("unknown stat category '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for category in StatCategory::ALL {
            assert_eq!(category.as_str().parse::<StatCategory>().unwrap(), category);
        }
        assert_eq!("Team_Pitching".parse::<StatCategory>().unwrap(), StatCategory::TeamPitching);
        assert!("fielding".parse::<StatCategory>().is_err());
    }

    #[test]
    fn test_serde_uses_same_names() {
        let json = serde_json::to_string(&StatCategory::SavantBattedBallProfile).unwrap();
        assert_eq!(json, "\"savant-batted-ball-profile\"");
    }

    #[test]
    fn test_categories_per_site() {
        assert_eq!(
            StatCategory::for_site(Site::BaseballReferencePlayer),
            vec![StatCategory::PlayerBatting, StatCategory::PlayerPitching]
        );
        assert_eq!(StatCategory::for_site(Site::SavantPlayer).len(), 5);
    }

    #[test]
    fn test_statcast_tables_drop_average_row() {
        assert_eq!(StatCategory::SavantStatcastBatting.table_spec().drop_trailing, 1);
        assert_eq!(StatCategory::SavantStatcastPitching.table_spec().drop_trailing, 1);
        assert_eq!(StatCategory::SavantPitchTracking.table_spec().drop_trailing, 0);
    }

    #[test]
    fn test_container_locators() {
        let spec = StatCategory::SavantPitchTracking.table_spec();
        assert_eq!(spec.locator.container_id(), Some("pitchingBreakdown"));
        assert_eq!(spec.locator.table_id(), None);

        let spec = StatCategory::PlayerBatting.table_spec();
        assert_eq!(spec.locator.table_id(), Some("batting_standard"));
    }
}
