//! The maintenance commands.
//!
//! Each command loads what it needs from the [`DataDir`], transforms it in
//! memory and writes it back. With `dry_run` set nothing is written; the
//! same counts are still computed and logged.

use crate::audit::{AuditReport, audit_registry, audit_reviews};
use crate::cli::Command;
use crate::config::Config;
use crate::dedupe::{content_fingerprint, dedupe_reviews};
use crate::error::StoreError;
use crate::models::{ContentTier, Review, ShowsFile};
use crate::normalization::{OutletResolution, OutletResolver, tidy_critic_display};
use crate::outputs::{json, markdown};
use crate::quality::{FLAG_TRUNCATED, QualityIssue, QualityReport, assess};
use crate::scoring::aggregate::{ShowScoresFile, aggregate_show};
use crate::scoring::apply_scores;
use crate::store::{DataDir, save_json};
use crate::text::{clean_text, strip_trailing_junk, word_count};
use crate::utils::truncate_for_log;
use chrono::{SecondsFormat, Utc};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::path::Path;
use std::time::Instant;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Everything a command needs.
#[derive(Debug, Clone)]
pub struct Context {
    pub data: DataDir,
    pub config: Config,
    pub dry_run: bool,
}

impl Context {
    async fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        if self.dry_run {
            info!(path = %path.display(), "Dry run; not writing");
            return Ok(());
        }
        save_json(path, value).await
    }

    async fn load_shows_or_empty(&self) -> Result<ShowsFile, StoreError> {
        match self.data.load_shows().await {
            Err(e) if e.is_missing() => {
                warn!(path = %self.data.shows_path().display(), "No shows.json; show titles unavailable");
                Ok(ShowsFile::default())
            }
            other => other,
        }
    }

    async fn resolver(&self) -> Result<OutletResolver, StoreError> {
        let registry = self.data.load_registry().await?;
        Ok(OutletResolver::new(&registry))
    }
}

/// Run one subcommand, logging how long it took.
pub async fn run(command: &Command, ctx: &Context) -> Result<(), Box<dyn Error>> {
    let started = Instant::now();
    info!(command = command.name(), data_dir = %ctx.data.root().display(), dry_run = ctx.dry_run, "Command starting");

    match command {
        Command::Clean => {
            clean(ctx).await?;
        }
        Command::Normalize => {
            normalize(ctx).await?;
        }
        Command::Dedupe => {
            dedupe(ctx).await?;
        }
        Command::Score => {
            score(ctx).await?;
        }
        Command::Rebuild => {
            rebuild(ctx).await?;
        }
        Command::Audit { strict } => {
            audit(ctx, *strict).await?;
        }
        Command::Pipeline => {
            clean(ctx).await?;
            normalize(ctx).await?;
            rebuild(ctx).await?;
            audit(ctx, false).await?;
        }
    }

    let elapsed = started.elapsed();
    info!(
        command = command.name(),
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Command complete"
    );
    Ok(())
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn show_titles(shows: &ShowsFile) -> HashMap<&str, &str> {
    shows
        .shows
        .iter()
        .map(|s| (s.id.as_str(), s.title.as_str()))
        .collect()
}

fn label_of<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Clean a review's full text in place and record its tier, word count and
/// fingerprint.
///
/// Returns the quality report when there was full text to assess. A review
/// with no full text is an `excerpt` when it carries aggregator quotes and
/// `invalid` otherwise. Text that ended in a "continue reading" link or an
/// ellipsis is flagged, and a flagged review never rates above `truncated`,
/// so running clean again gives the same tier.
pub fn clean_review(review: &mut Review, show_title: Option<&str>, config: &Config) -> Option<QualityReport> {
    let Some(raw) = review.full_text.as_deref() else {
        let tier = if review.excerpts().is_empty() {
            ContentTier::Invalid
        } else {
            ContentTier::Excerpt
        };
        review.content_tier = Some(tier);
        review.word_count = review.best_text().map(word_count);
        return None;
    };

    let cleaned = clean_text(raw);
    let (text, stripped) = strip_trailing_junk(&cleaned);
    if stripped {
        debug!(show_id = %review.show_id, outlet_id = %review.outlet_id, "Removed trailing link text");
        review.add_flag(FLAG_TRUNCATED);
    }
    let mut report = assess(&text, show_title, &review.excerpts(), config);
    // The marker is gone from the stored text; the flag remembers it.
    if review.has_flag(FLAG_TRUNCATED) && report.tier == ContentTier::Complete {
        report.tier = ContentTier::Truncated;
        report.issues.push(QualityIssue::TruncationMarker);
    }
    if report.tier == ContentTier::Invalid {
        debug!(
            show_id = %review.show_id,
            outlet_id = %review.outlet_id,
            issues = ?report.issues,
            preview = %truncate_for_log(&text, 120),
            "Review text is unusable"
        );
    }

    review.word_count = Some(word_count(&text));
    review.content_hash = content_fingerprint(&text);
    review.content_tier = Some(report.tier);
    review.full_text = Some(text);
    Some(report)
}

/// Canonicalise a review's outlet id, outlet display name and critic byline.
pub fn normalize_review(review: &mut Review, resolver: &OutletResolver) -> OutletResolution {
    let resolution = resolver.resolve(review);
    if resolution.known {
        if let Some(display) = resolver.display_name(&resolution.id) {
            review.outlet = display.to_string();
        }
    }
    review.outlet_id = resolution.id.clone();

    if let Some(name) = review.critic_name.take() {
        let tidy = tidy_critic_display(&name);
        review.critic_name = (!tidy.is_empty()).then_some(tidy);
    }
    resolution
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanSummary {
    pub files: usize,
    pub changed: usize,
    pub tiers: BTreeMap<String, usize>,
    pub issues: BTreeMap<String, usize>,
}

#[instrument(level = "info", skip_all)]
pub async fn clean(ctx: &Context) -> Result<CleanSummary, Box<dyn Error>> {
    let shows = ctx.load_shows_or_empty().await?;
    let titles = show_titles(&shows);
    let files = ctx.data.load_review_texts(ctx.config.concurrency).await?;

    let mut summary = CleanSummary {
        files: files.len(),
        ..Default::default()
    };
    let mut issues = Vec::new();

    for mut file in files {
        let before = file.review.clone();
        let title = titles.get(file.review.show_id.as_str()).copied();
        if let Some(report) = clean_review(&mut file.review, title, &ctx.config) {
            issues.extend(report.issues.iter().map(label_of));
        }
        if file.review != before {
            summary.changed += 1;
            ctx.save(&file.path, &file.review).await?;
        }
        if let Some(tier) = file.review.content_tier {
            *summary.tiers.entry(tier.to_string()).or_insert(0) += 1;
        }
    }
    summary.issues = issues.into_iter().counts().into_iter().collect();

    info!(
        files = summary.files,
        changed = summary.changed,
        tiers = ?summary.tiers,
        issues = ?summary.issues,
        "Clean complete"
    );
    Ok(summary)
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeSummary {
    pub reviews: usize,
    pub review_texts: usize,
    pub changed: usize,
    pub moved: usize,
    pub unknown_outlets: BTreeMap<String, usize>,
}

#[instrument(level = "info", skip_all)]
pub async fn normalize(ctx: &Context) -> Result<NormalizeSummary, Box<dyn Error>> {
    let resolver = ctx.resolver().await?;
    let mut summary = NormalizeSummary::default();
    let mut unknown = Vec::new();

    let mut reviews_file = ctx.data.load_reviews_or_default().await?;
    summary.reviews = reviews_file.reviews.len();
    let mut reviews_changed = 0;
    for review in &mut reviews_file.reviews {
        let before = review.clone();
        let resolution = normalize_review(review, &resolver);
        if !resolution.known {
            unknown.push(resolution.id);
        }
        if *review != before {
            reviews_changed += 1;
        }
    }
    if reviews_changed > 0 {
        ctx.save(&ctx.data.reviews_path(), &reviews_file).await?;
    }
    summary.changed += reviews_changed;

    let files = ctx.data.load_review_texts(ctx.config.concurrency).await?;
    summary.review_texts = files.len();
    for mut file in files {
        let before = file.review.clone();
        let resolution = normalize_review(&mut file.review, &resolver);
        if !resolution.known {
            unknown.push(resolution.id);
        }
        let changed = file.review != before;
        if changed {
            summary.changed += 1;
        }

        let review = &file.review;
        let canonical = ctx
            .data
            .review_text_path(&review.show_id, &review.outlet_id, review.critic_name.as_deref());
        if canonical != file.path && !canonical.exists() {
            ctx.save(&canonical, review).await?;
            if !ctx.dry_run {
                fs::remove_file(&file.path).await?;
            }
            debug!(from = %file.path.display(), to = %canonical.display(), "Renamed review-text file");
            summary.moved += 1;
        } else if changed {
            ctx.save(&file.path, review).await?;
        }
    }

    summary.unknown_outlets = unknown.into_iter().counts().into_iter().collect();
    if !summary.unknown_outlets.is_empty() {
        warn!(outlets = ?summary.unknown_outlets, "Outlets not in the registry or built-in tables");
    }
    info!(
        reviews = summary.reviews,
        review_texts = summary.review_texts,
        changed = summary.changed,
        moved = summary.moved,
        "Normalize complete"
    );
    Ok(summary)
}

#[instrument(level = "info", skip_all)]
pub async fn dedupe(ctx: &Context) -> Result<(), Box<dyn Error>> {
    let mut reviews_file = ctx.data.load_reviews().await?;
    let reviews = std::mem::take(&mut reviews_file.reviews);
    let (survivors, report) = dedupe_reviews(reviews, &ctx.config);

    reviews_file.reviews = survivors;
    reviews_file.meta.total_reviews = Some(reviews_file.reviews.len());
    ctx.save(&ctx.data.reviews_path(), &reviews_file).await?;
    if !ctx.dry_run {
        json::write_report(&report, &ctx.data.reports_dir(), "dedupe").await?;
    }
    Ok(())
}

/// Show-level aggregates for every show, in `shows.json` order.
pub fn build_show_scores(
    shows: &ShowsFile,
    reviews: &[Review],
    resolver: &OutletResolver,
    config: &Config,
) -> ShowScoresFile {
    let scores = shows
        .shows
        .iter()
        .map(|show| aggregate_show(show, reviews, resolver, config))
        .collect::<Vec<_>>();
    let scored = scores.iter().filter(|s| s.score.is_some()).count();
    info!(shows = scores.len(), scored, "Aggregated show scores");
    ShowScoresFile {
        generated_at: now_rfc3339(),
        shows: scores,
    }
}

#[instrument(level = "info", skip_all)]
pub async fn score(ctx: &Context) -> Result<(), Box<dyn Error>> {
    let mut reviews_file = ctx.data.load_reviews().await?;
    let summary = apply_scores(&mut reviews_file.reviews);
    info!(
        assigned = summary.assigned,
        changed = summary.changed,
        unscored = summary.unscored,
        by_source = ?summary.by_source,
        "Scored reviews"
    );
    if summary.changed > 0 {
        ctx.save(&ctx.data.reviews_path(), &reviews_file).await?;
    }

    let shows = ctx.data.load_shows().await?;
    let resolver = ctx.resolver().await?;
    let show_scores = build_show_scores(&shows, &reviews_file.reviews, &resolver, &ctx.config);
    ctx.save(&ctx.data.show_scores_path(), &show_scores).await?;
    Ok(())
}

/// Rebuild `reviews.json` from `review-texts/`.
///
/// Every text file is cleaned and normalized in memory, then the set is
/// deduplicated and scored. Full text stays in `review-texts/`; the rebuilt
/// records carry only its tier, word count and fingerprint.
#[instrument(level = "info", skip_all)]
pub async fn rebuild(ctx: &Context) -> Result<(), Box<dyn Error>> {
    let shows = ctx.load_shows_or_empty().await?;
    let titles = show_titles(&shows);
    let resolver = ctx.resolver().await?;
    let files = ctx.data.load_review_texts(ctx.config.concurrency).await?;

    let mut reviews: Vec<Review> = files.into_iter().map(|f| f.review).collect();
    for review in &mut reviews {
        normalize_review(review, &resolver);
        let title = titles.get(review.show_id.as_str()).copied();
        clean_review(review, title, &ctx.config);
    }

    let (mut reviews, dedupe_report) = dedupe_reviews(reviews, &ctx.config);
    let score_summary = apply_scores(&mut reviews);
    for review in &mut reviews {
        review.full_text = None;
    }
    reviews.sort_by(|a, b| {
        (&a.show_id, &a.outlet_id, &a.critic_name).cmp(&(&b.show_id, &b.outlet_id, &b.critic_name))
    });

    let mut reviews_file = ctx.data.load_reviews_or_default().await?;
    let previous = reviews_file.reviews.len();
    reviews_file.reviews = reviews;
    reviews_file.meta.last_updated = Some(now_rfc3339());
    reviews_file.meta.total_reviews = Some(reviews_file.reviews.len());

    info!(
        previous,
        rebuilt = reviews_file.reviews.len(),
        merged = dedupe_report.removed,
        scored = score_summary.assigned,
        unscored = score_summary.unscored,
        "Rebuilt reviews"
    );
    ctx.save(&ctx.data.reviews_path(), &reviews_file).await?;

    let show_scores = build_show_scores(&shows, &reviews_file.reviews, &resolver, &ctx.config);
    ctx.save(&ctx.data.show_scores_path(), &show_scores).await?;
    if !ctx.dry_run {
        json::write_report(&dedupe_report, &ctx.data.reports_dir(), "dedupe").await?;
    }
    Ok(())
}

#[instrument(level = "info", skip_all, fields(strict = strict))]
pub async fn audit(ctx: &Context, strict: bool) -> Result<AuditReport, Box<dyn Error>> {
    let shows = ctx.data.load_shows().await?;
    let registry = ctx.data.load_registry().await?;
    let reviews_file = ctx.data.load_reviews_or_default().await?;

    let report = AuditReport {
        generated_at: now_rfc3339(),
        registry: audit_registry(&registry, &reviews_file.reviews),
        reviews: audit_reviews(&shows, &reviews_file.reviews, &ctx.config),
    };

    if !ctx.dry_run {
        json::write_report(&report, &ctx.data.reports_dir(), "audit").await?;
        let md = markdown::audit_to_markdown(&report);
        markdown::write_markdown(&md, &ctx.data.reports_dir(), "audit").await?;
    }

    if report.is_clean() {
        info!("Audit clean");
    } else {
        warn!("Audit found problems");
        if strict {
            return Err("audit found problems (strict mode)".into());
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReviewsFile, ScoreSource};
    use crate::store::load_json;

    async fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(path, body).await.unwrap();
    }

    async fn fixture() -> (tempfile::TempDir, Context) {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        write(&data.shows_path(), r#"{"shows":[{"id":"wicked-2003","title":"Wicked"}]}"#).await;

        let texts = data.review_texts_dir().join("wicked-2003");
        write(
            &texts.join("nytimes--ben-brantley.json"),
            r#"{"showId":"wicked-2003","outlet":"The New York Times","criticName":"By Ben Brantley","originalScore":"4/5","fullText":"<p>Wicked is a spectacle.</p>"}"#,
        )
        .await;
        write(
            &texts.join("nyt--brantley-dtli.json"),
            r#"{"outlet":"NYT","criticName":"Ben Brantley","dtliThumb":"Up"}"#,
        )
        .await;
        write(
            &texts.join("variety--unknown.json"),
            r#"{"showId":"wicked-2003","outlet":"Variety","bwwThumb":"Down"}"#,
        )
        .await;

        let ctx = Context {
            data,
            config: Config::default(),
            dry_run: false,
        };
        (dir, ctx)
    }

    #[test]
    fn test_clean_review_without_full_text() {
        let config = Config::default();
        let mut quoted = Review {
            bww_excerpt: Some("A thrilling night out.".to_string()),
            ..Default::default()
        };
        assert_eq!(clean_review(&mut quoted, None, &config), None);
        assert_eq!(quoted.content_tier, Some(ContentTier::Excerpt));
        assert_eq!(quoted.word_count, Some(4));

        let mut empty = Review::default();
        clean_review(&mut empty, None, &config);
        assert_eq!(empty.content_tier, Some(ContentTier::Invalid));
        assert_eq!(empty.word_count, None);
    }

    #[test]
    fn test_clean_review_strips_html() {
        let mut review = Review {
            full_text: Some("<p>Wicked is a spectacle.</p>".to_string()),
            ..Default::default()
        };
        let report = clean_review(&mut review, Some("Wicked"), &Config::default()).unwrap();
        assert_eq!(report.tier, ContentTier::Stub);
        assert_eq!(review.full_text.as_deref(), Some("Wicked is a spectacle."));
        assert_eq!(review.word_count, Some(4));
        assert_eq!(review.content_hash, None);
    }

    #[test]
    fn test_clean_review_is_stable_across_runs() {
        let config = Config::default();
        let body = "The cast sings well. ".repeat(100);
        let mut review = Review {
            full_text: Some(format!("{body}Continue reading the main story")),
            ..Default::default()
        };

        let first = clean_review(&mut review, None, &config).unwrap();
        let after_first = review.clone();
        let second = clean_review(&mut review, None, &config).unwrap();

        assert_eq!(first.tier, ContentTier::Truncated);
        assert_eq!(second.tier, ContentTier::Truncated);
        assert!(second.issues.contains(&QualityIssue::TruncationMarker));
        assert!(review.has_flag(FLAG_TRUNCATED));
        assert!(review.full_text.as_deref().unwrap().ends_with("sings well."));
        assert_eq!(review, after_first);
    }

    #[test]
    fn test_normalize_review() {
        let resolver = OutletResolver::new(&Default::default());
        let mut review = Review {
            outlet: "NY Times".to_string(),
            critic_name: Some("By Jesse Green, The New York Times".to_string()),
            ..Default::default()
        };
        let resolution = normalize_review(&mut review, &resolver);
        assert!(resolution.known);
        assert_eq!(review.outlet_id, "nytimes");
        assert_eq!(review.outlet, "The New York Times");
        assert_eq!(review.critic_name.as_deref(), Some("Jesse Green"));

        let mut blank = Review {
            outlet: "Some Blog".to_string(),
            critic_name: Some("  ".to_string()),
            ..Default::default()
        };
        let resolution = normalize_review(&mut blank, &resolver);
        assert!(!resolution.known);
        assert_eq!(blank.outlet_id, "some-blog");
        assert_eq!(blank.critic_name, None);
    }

    #[tokio::test]
    async fn test_clean_command_updates_files() {
        let (_dir, ctx) = fixture().await;
        let summary = clean(&ctx).await.unwrap();
        assert_eq!(summary.files, 3);
        assert_eq!(summary.changed, 3);
        assert_eq!(summary.tiers.get("stub"), Some(&1));
        assert_eq!(summary.tiers.get("invalid"), Some(&2));

        let path = ctx
            .data
            .review_texts_dir()
            .join("wicked-2003")
            .join("nytimes--ben-brantley.json");
        let review: Review = load_json(&path).await.unwrap();
        assert_eq!(review.full_text.as_deref(), Some("Wicked is a spectacle."));
        assert_eq!(review.content_tier, Some(ContentTier::Stub));

        let again = clean(&ctx).await.unwrap();
        assert_eq!(again.changed, 0);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let (_dir, mut ctx) = fixture().await;
        ctx.dry_run = true;
        let path = ctx
            .data
            .review_texts_dir()
            .join("wicked-2003")
            .join("nytimes--ben-brantley.json");
        let before = fs::read_to_string(&path).await.unwrap();

        let summary = clean(&ctx).await.unwrap();
        assert_eq!(summary.changed, 3);
        assert_eq!(fs::read_to_string(&path).await.unwrap(), before);

        rebuild(&ctx).await.unwrap();
        assert!(!ctx.data.reviews_path().exists());
        assert!(!ctx.data.reports_dir().exists());
    }

    #[tokio::test]
    async fn test_normalize_command_renames_files() {
        let (_dir, ctx) = fixture().await;
        let texts = ctx.data.review_texts_dir().join("wicked-2003");
        fs::remove_file(texts.join("nytimes--ben-brantley.json")).await.unwrap();

        let summary = normalize(&ctx).await.unwrap();
        assert_eq!(summary.reviews, 0);
        assert_eq!(summary.review_texts, 2);
        assert_eq!(summary.changed, 2);
        assert_eq!(summary.moved, 1);
        assert!(summary.unknown_outlets.is_empty());

        assert!(!texts.join("nyt--brantley-dtli.json").exists());
        let moved: Review = load_json(&texts.join("nytimes--ben-brantley.json")).await.unwrap();
        assert_eq!(moved.outlet_id, "nytimes");
        assert_eq!(moved.outlet, "The New York Times");
        assert_eq!(moved.show_id, "wicked-2003");
    }

    #[tokio::test]
    async fn test_normalize_keeps_file_when_canonical_name_taken() {
        let (_dir, ctx) = fixture().await;
        let summary = normalize(&ctx).await.unwrap();
        assert_eq!(summary.review_texts, 3);
        assert_eq!(summary.moved, 0);

        let texts = ctx.data.review_texts_dir().join("wicked-2003");
        let kept: Review = load_json(&texts.join("nyt--brantley-dtli.json")).await.unwrap();
        assert_eq!(kept.outlet_id, "nytimes");
        let canonical: Review = load_json(&texts.join("nytimes--ben-brantley.json")).await.unwrap();
        assert_eq!(canonical.critic_name.as_deref(), Some("Ben Brantley"));
    }

    #[tokio::test]
    async fn test_normalize_renames_unchanged_misnamed_file() {
        let (_dir, ctx) = fixture().await;
        let texts = ctx.data.review_texts_dir().join("wicked-2003");
        write(
            &texts.join("old-name.json"),
            r#"{"showId":"wicked-2003","outletId":"variety","outlet":"Variety","criticName":"Frank Rizzo"}"#,
        )
        .await;

        let summary = normalize(&ctx).await.unwrap();
        assert_eq!(summary.review_texts, 4);
        assert_eq!(summary.changed, 3);
        assert_eq!(summary.moved, 1);
        assert!(!texts.join("old-name.json").exists());
        let moved: Review = load_json(&texts.join("variety--frank-rizzo.json")).await.unwrap();
        assert_eq!(moved.critic_name.as_deref(), Some("Frank Rizzo"));

        let again = normalize(&ctx).await.unwrap();
        assert_eq!(again.changed, 0);
        assert_eq!(again.moved, 0);
    }

    #[tokio::test]
    async fn test_rebuild_then_audit() {
        let (_dir, ctx) = fixture().await;
        rebuild(&ctx).await.unwrap();

        let rebuilt: ReviewsFile = ctx.data.load_reviews().await.unwrap();
        assert_eq!(rebuilt.meta.total_reviews, Some(2));
        assert!(rebuilt.meta.last_updated.is_some());
        assert_eq!(rebuilt.reviews.len(), 2);

        let nyt = &rebuilt.reviews[0];
        assert_eq!(nyt.outlet_id, "nytimes");
        assert_eq!(nyt.critic_name.as_deref(), Some("Ben Brantley"));
        assert_eq!(nyt.assigned_score, Some(80.0));
        assert_eq!(nyt.score_source, Some(ScoreSource::OriginalRating));
        assert_eq!(nyt.dtli_thumb.as_deref(), Some("Up"));
        assert_eq!(nyt.full_text, None);

        let variety = &rebuilt.reviews[1];
        assert_eq!(variety.outlet_id, "variety");
        assert_eq!(variety.assigned_score, Some(35.0));

        let scores: ShowScoresFile = load_json(&ctx.data.show_scores_path()).await.unwrap();
        assert_eq!(scores.shows.len(), 1);
        assert_eq!(scores.shows[0].review_count, 2);
        assert_eq!(scores.shows[0].score, None);
        assert_eq!(scores.shows[0].label, "TBD");

        // No registry file, so both outlets in use are unregistered.
        let report = audit(&ctx, false).await.unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.registry.unregistered_outlets.len(), 2);
        assert_eq!(report.reviews.total_reviews, 2);
        assert!(audit(&ctx, true).await.is_err());

        let dated = crate::outputs::dated_dir(&ctx.data.reports_dir());
        assert!(dated.join("audit.json").exists());
        assert!(dated.join("audit.md").exists());
        assert!(dated.join("dedupe.json").exists());
    }
}
