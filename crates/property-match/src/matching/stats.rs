use serde::{Deserialize, Serialize};

use super::domain::MatchRecord;

pub const EXCELLENT_SCORE: u8 = 90;
pub const GOOD_SCORE: u8 = 80;
pub const FAIR_SCORE: u8 = 70;

/// Match-quality buckets and notification latency over a set of match rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub total_matches: usize,
    pub average_score: f64,
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub notified: usize,
    /// Mean of `notified_at - created_at` over notified rows.
    pub average_notification_latency_seconds: Option<f64>,
}

impl MatchStats {
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut stats = MatchStats {
            total_matches: records.len(),
            ..MatchStats::default()
        };
        if records.is_empty() {
            return stats;
        }

        let mut score_sum = 0u64;
        let mut latency_sum = 0f64;
        for record in records {
            score_sum += u64::from(record.match_score);
            match record.match_score {
                score if score >= EXCELLENT_SCORE => stats.excellent += 1,
                score if score >= GOOD_SCORE => stats.good += 1,
                score if score >= FAIR_SCORE => stats.fair += 1,
                _ => {}
            }

            if let (true, Some(notified_at)) = (record.notified, record.notified_at) {
                stats.notified += 1;
                latency_sum += (notified_at - record.created_at).num_milliseconds() as f64 / 1000.0;
            }
        }

        stats.average_score = round_two(score_sum as f64 / records.len() as f64);
        if stats.notified > 0 {
            stats.average_notification_latency_seconds =
                Some(round_two(latency_sum / stats.notified as f64));
        }
        stats
    }
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
