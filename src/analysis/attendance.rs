//! Participation ledger: accumulates boss-kill attendance and raid-size
//! membership per canonical identity from participation records.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceTally {
    pub bosses_attended: u32,
    pub bosses_attended_25: u32,
    pub raid_sizes: BTreeSet<String>,
}

pub struct ParticipationLedger {
    total_bosses: u32,
    bonus_rate: f64,
    tallies: HashMap<String, AttendanceTally>,
    seen_tags: HashSet<String>,
    /// Sum of boss counts across distinct 25-man source tags; denominator for
    /// the 25-man bonus share.
    total_bosses_25: u32,
}

fn raid_size_for_tag(source_tag: &str) -> &'static str {
    if source_tag.contains("25man") {
        "25"
    } else {
        "10"
    }
}

impl ParticipationLedger {
    pub fn new(config: &AnalysisConfig) -> ParticipationLedger {
        ParticipationLedger {
            total_bosses: config.total_bosses,
            bonus_rate: config.raid_25_bonus,
            tallies: HashMap::new(),
            seen_tags: HashSet::new(),
            total_bosses_25: 0,
        }
    }

    pub fn ingest(&mut self, identity: &str, source_tag: &str, config: &AnalysisConfig) {
        let bosses = config.bosses_for_tag(source_tag);
        let size = raid_size_for_tag(source_tag);

        if self.seen_tags.insert(source_tag.to_string()) && size == "25" {
            self.total_bosses_25 += bosses;
        }

        let tally = self.tallies.entry(identity.to_string()).or_default();
        tally.bosses_attended += bosses;
        if size == "25" {
            tally.bosses_attended_25 += bosses;
        }
        tally.raid_sizes.insert(size.to_string());
    }

    pub fn tally(&self, identity: &str) -> Option<&AttendanceTally> {
        self.tallies.get(identity)
    }

    /// Attendance percentage: bosses attended over the campaign total, scaled
    /// by the 25-man bonus proportional to the player's share of 25-man
    /// bosses. May exceed 100% when the bonus rate is non-zero.
    pub fn attendance_percent(&self, identity: &str) -> f64 {
        let Some(tally) = self.tallies.get(identity) else {
            return 0.0;
        };
        let base = (tally.bosses_attended as f64 / self.total_bosses as f64) * 100.0;
        if tally.raid_sizes.contains("25") && self.total_bosses_25 > 0 {
            let share = tally.bosses_attended_25 as f64 / self.total_bosses_25 as f64;
            base * (1.0 + self.bonus_rate * share)
        } else {
            base
        }
    }

    pub fn identities(&self) -> impl Iterator<Item = &String> {
        self.tallies.keys()
    }
}
