//! Markdown rendering of an [`AuditReport`].
//!
//! The report is meant to be read in a PR or pasted into an issue, so every
//! section is present even when it has nothing to say.

use crate::audit::{AuditReport, ReviewRef};
use crate::models::ContentTier;
use crate::utils::upcase;
use std::error::Error;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Render the audit report as Markdown.
pub fn audit_to_markdown(report: &AuditReport) -> String {
    let mut md = String::new();
    // Writing into a String cannot fail.
    let _ = render(&mut md, report);
    md
}

fn render(md: &mut String, report: &AuditReport) -> fmt::Result {
    let status = if report.is_clean() { "clean" } else { "problems found" };
    writeln!(md, "# Data Audit\n")?;
    writeln!(md, "Generated {} ({}).\n", report.generated_at, status)?;

    let registry = &report.registry;
    writeln!(md, "## Outlet Registry\n")?;
    section_header(md, "Unregistered outlets", registry.unregistered_outlets.len())?;
    for (id, count) in &registry.unregistered_outlets {
        writeln!(md, "- `{id}` ({count} reviews)")?;
    }
    section_header(md, "Alias conflicts", registry.alias_conflicts.len())?;
    for conflict in &registry.alias_conflicts {
        let outlets: Vec<String> = conflict.outlets.iter().map(|o| format!("`{o}`")).collect();
        writeln!(md, "- \"{}\" claimed by {}", conflict.alias, outlets.join(", "))?;
    }
    id_list(md, "Invalid tiers", &registry.invalid_tiers)?;
    id_list(md, "Outlets without domains", &registry.missing_domains)?;
    id_list(md, "Unused outlets", &registry.unused_outlets)?;

    let reviews = &report.reviews;
    writeln!(md, "\n## Reviews\n")?;
    writeln!(md, "- Total reviews: {}", reviews.total_reviews)?;
    writeln!(md, "- Unscored: {}", reviews.unscored)?;
    writeln!(md, "- Duplicate groups: {}", reviews.duplicate_groups)?;
    writeln!(md, "- Misattribution suspects: {}\n", reviews.misattribution_groups)?;

    section_header(md, "Unknown show ids", reviews.unknown_show_ids.len())?;
    for (id, count) in &reviews.unknown_show_ids {
        writeln!(md, "- `{id}` ({count} reviews)")?;
    }
    review_list(md, "Scores out of range", &reviews.out_of_range)?;
    review_list(md, "Score and thumb conflicts", &reviews.thumb_conflicts)?;

    section_header(md, "Shows below the scoring minimum", reviews.shows_below_minimum.len())?;
    for show in &reviews.shows_below_minimum {
        writeln!(md, "- `{}`: {} scored reviews", show.show_id, show.review_count)?;
    }

    writeln!(md, "\n### Content tiers\n")?;
    writeln!(md, "| Tier | Reviews |")?;
    writeln!(md, "|------|---------|")?;
    let tiers = ContentTier::ALL.iter().map(|t| t.as_str()).chain(["unassessed"]);
    for tier in tiers {
        let count = reviews.tier_distribution.get(tier).copied().unwrap_or(0);
        writeln!(md, "| {} | {} |", upcase(tier), count)?;
    }
    writeln!(md)?;

    if !reviews.flag_counts.is_empty() {
        writeln!(md, "### Flags\n")?;
        for (flag, count) in &reviews.flag_counts {
            writeln!(md, "- `{flag}`: {count}")?;
        }
        writeln!(md)?;
    }
    Ok(())
}

fn section_header(md: &mut String, title: &str, count: usize) -> fmt::Result {
    if !md.ends_with("\n\n") {
        writeln!(md)?;
    }
    writeln!(md, "### {title} ({count})\n")?;
    if count == 0 {
        writeln!(md, "None.\n")?;
    }
    Ok(())
}

fn id_list(md: &mut String, title: &str, ids: &[String]) -> fmt::Result {
    section_header(md, title, ids.len())?;
    for id in ids {
        writeln!(md, "- `{id}`")?;
    }
    Ok(())
}

fn review_list(md: &mut String, title: &str, refs: &[ReviewRef]) -> fmt::Result {
    section_header(md, title, refs.len())?;
    for r in refs {
        let critic = r.critic_name.as_deref().unwrap_or("unknown critic");
        writeln!(md, "- `{}` / `{}` ({}): {}", r.show_id, r.outlet_id, critic, r.detail)?;
    }
    Ok(())
}

/// Write rendered Markdown to `<reports_dir>/<date>/<name>.md`.
#[instrument(level = "info", skip_all, fields(reports_dir = %reports_dir.display(), %name))]
pub async fn write_markdown(markdown: &str, reports_dir: &Path, name: &str) -> Result<PathBuf, Box<dyn Error>> {
    let dir = super::dated_dir(reports_dir);
    fs::create_dir_all(&dir).await?;
    let path = dir.join(format!("{name}.md"));
    fs::write(&path, markdown).await?;
    info!(path = %path.display(), "Wrote Markdown report");
    Ok(path)
}
