use crate::infra::{
    in_memory_matching, repository_error, seed_demo_catalog, DEMO_BUYERS, DEMO_ORGANIZATION,
};
use chrono::Utc;
use clap::Args;
use property_match::config::MatchingConfig;
use property_match::error::AppError;
use property_match::matching::{BuyerProfileId, MatchStore, OrganizationId};

const DEMO_RECOMMENDATION_LIMIT: usize = 3;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Organization the sample catalog is seeded under
    #[arg(long, default_value = DEMO_ORGANIZATION)]
    pub(crate) organization: String,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let organization_id = OrganizationId::new(args.organization);
    let now = Utc::now();

    let matching = in_memory_matching(MatchingConfig::from_env()?);
    seed_demo_catalog(&matching.catalog, &organization_id, now).map_err(repository_error)?;
    let config = matching.service.config();

    println!("Property matching demo for {organization_id}");
    println!(
        "- thresholds: auto-match {} | recommendations {} | retention {} days",
        config.auto_match_threshold, config.recommendation_threshold, config.retention_days
    );

    let report = matching.service.bulk_match_at(&organization_id, now)?;
    println!(
        "\nBulk reconciliation: {} matches in {:.3}s ({:.1} matches/s), {} stale rows purged",
        report.matches_created,
        report.duration_seconds,
        report.matches_per_second,
        report.purged
    );
    println!(
        "- notifications: {} sent | {} without address | {} already notified | {} failed",
        report.notifications.sent,
        report.notifications.skipped_no_address,
        report.notifications.skipped_already_notified,
        report.notifications.failed
    );

    let mut records = matching
        .store
        .records(Some(&organization_id))
        .map_err(repository_error)?;
    records.sort_by(|left, right| right.match_score.cmp(&left.match_score));
    if records.is_empty() {
        println!("\nPersisted matches: none above threshold");
    } else {
        println!("\nPersisted matches:");
        for record in &records {
            println!(
                "  - {} -> {}: {}% ({})",
                record.key.property_id,
                record.key.buyer_profile_id,
                record.match_score,
                record.top_reasons(3).join("; ")
            );
        }
    }

    println!("\nRecommendations (top {DEMO_RECOMMENDATION_LIMIT} per buyer):");
    for buyer in DEMO_BUYERS {
        let ranked = matching
            .service
            .recommend(&BuyerProfileId::new(buyer), DEMO_RECOMMENDATION_LIMIT)?;
        if ranked.is_empty() {
            println!("  {buyer}: nothing clears the recommendation threshold");
            continue;
        }
        println!("  {buyer}:");
        for entry in ranked {
            println!(
                "    - {} ({}) {}% | {}",
                entry.property.title,
                entry.property.location.display(),
                entry.score,
                entry.property.price_label()
            );
        }
    }

    let stats = matching.service.get_stats(Some(&organization_id))?;
    println!(
        "\nMatch quality: {} total | avg score {:.1} | {} excellent / {} good / {} fair",
        stats.total_matches, stats.average_score, stats.excellent, stats.good, stats.fair
    );
    match stats.average_notification_latency_seconds {
        Some(latency) => println!(
            "- {} notified, average notification latency {:.2}s",
            stats.notified, latency
        ),
        None => println!("- no notifications recorded yet"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_for_custom_organization() {
        let args = DemoArgs {
            organization: "org-walkthrough".to_string(),
        };
        run_demo(args).expect("demo completes");
    }
}
