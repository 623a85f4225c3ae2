//! Markdown intelligence report for a single movie.

use chrono::{DateTime, Utc};

use crate::models::MovieDetail;

/// Attachment file name for a movie's report
pub fn report_filename(movie_id: u64) -> String {
    format!("INTELLIGENCE_REPORT_{}.md", movie_id)
}

/// Renders the report. Output depends only on the detail and `generated_at`.
pub fn render_report(detail: &MovieDetail, generated_at: DateTime<Utc>) -> String {
    let item = &detail.item;

    let name = if item.title.is_empty() {
        "UNKNOWN"
    } else {
        item.title.as_str()
    };
    let synopsis = detail
        .overview
        .as_deref()
        .filter(|o| !o.is_empty())
        .unwrap_or("No synopsis available in secure logs.");
    let pacing = item.pacing.map(|p| p.as_str()).unwrap_or("unknown");
    let weight = item.weight.map(|w| w.as_str()).unwrap_or("unknown");
    let primary = item.moods.first().map(String::as_str).unwrap_or("Drama");
    let secondary = item.moods.get(1).map(String::as_str).unwrap_or("Romance");

    let mut lines = vec![
        "# KAIROS_OS // INTELLIGENCE_REPORT".to_string(),
        format!("## TARGET_ID: {}", item.id),
        format!("## TARGET_NAME: {}", name),
        format!("## TIMESTAMP: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        String::new(),
        "---".to_string(),
        String::new(),
        "### [BRIEFING]".to_string(),
        format!("**SYNOPSIS**: {}", synopsis),
        "**METRICS**:".to_string(),
        format!("- Pacing: {}", pacing.to_uppercase()),
        format!("- Weight: {}", weight.to_uppercase()),
    ];

    if let Some(rating) = detail.rating {
        lines.push(format!("- Rating: {:.1}/10", rating));
    }
    if item.runtime > 0 {
        lines.push(format!("- Runtime: {} min", item.runtime));
    }
    if let Some(origin) = item.origin.as_deref() {
        lines.push(format!("- Origin: {}", origin));
    }

    lines.extend([
        String::new(),
        "### [NARRATIVE_STRUCTURE]".to_string(),
        format!(
            "The subject exhibits a complex multi-layered narrative architecture with primary focus on {} and secondary nodes of {}.",
            primary, secondary
        ),
        String::new(),
        "### [LEGAL]".to_string(),
        "This data is for KAIROS authorized personnel only. Unauthorized distribution is a breach of Protocol 9.".to_string(),
        String::new(),
        "---".to_string(),
        "// END_OF_LOG".to_string(),
    ]);

    let mut report = lines.join("\n");
    report.push('\n');
    report
}
