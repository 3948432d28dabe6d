use chrono::{DateTime, Local, Utc};

use crate::app::{AppContext, Result};
use crate::cycle::CycleReport;
use crate::daemon::Daemon;
use crate::normalizer::relative_time;

/// Poll until SIGINT/SIGTERM, then close the browser
pub async fn run_daemon(ctx: &AppContext) -> Result<()> {
    let cycle = ctx.start_cycle().await?;
    let mut daemon = Daemon::new(cycle, ctx.config.daemon.clone());
    daemon.shutdown_handle().listen_for_signals();

    let result = daemon.run().await;
    daemon.into_cycle().into_session().shutdown().await;
    result
}

/// Run one cycle and print the delivered posts
pub async fn run_once(ctx: &AppContext) -> Result<()> {
    let mut cycle = ctx.start_cycle().await?;
    let result = cycle.run().await;
    cycle.into_session().shutdown().await;

    print!("{}", format_report(&result?));
    Ok(())
}

pub fn parse_time(text: &str) -> Result<()> {
    let posted_at = relative_time::parse(text, Utc::now())?;
    println!("{}", format_time(posted_at));
    Ok(())
}

fn format_time(at: DateTime<Utc>) -> String {
    format!(
        "{} ({} local, unix {})",
        at.to_rfc3339(),
        at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
        at.timestamp()
    )
}

fn format_report(report: &CycleReport) -> String {
    let mut out = String::new();

    if report.delivered.is_empty() {
        out.push_str("No new posts\n");
    }
    for post in &report.delivered {
        let preview: String = post.text.chars().take(60).collect();
        out.push_str(&format!(
            "{} {}: {}\n",
            post.posted_at.format("%Y-%m-%d %H:%M"),
            post.author,
            preview.replace('\n', " ")
        ));
    }

    out.push_str(&format!(
        "Delivered {}, already seen {}, skipped {} without author, {} failed deliveries\n",
        report.delivered.len(),
        report.already_seen,
        report.missing_author,
        report.delivery_failures
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutboundPost, PostFields};
    use chrono::TimeZone;

    #[test]
    fn test_format_empty_report() {
        let report = CycleReport {
            already_seen: 4,
            ..Default::default()
        };
        let out = format_report(&report);
        assert!(out.starts_with("No new posts\n"));
        assert!(out.contains("already seen 4"));
    }

    #[test]
    fn test_format_report_lists_posts() {
        let posted_at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let report = CycleReport {
            delivered: vec![OutboundPost::new(
                PostFields::new("alice", "Selling a bench\ncollect only"),
                posted_at,
            )],
            delivery_failures: 1,
            ..Default::default()
        };

        let out = format_report(&report);
        assert!(out.contains("2024-03-01 09:30 alice: Selling a bench collect only\n"));
        assert!(out.contains("Delivered 1"));
        assert!(out.contains("1 failed deliveries"));
    }

    #[test]
    fn test_format_time_includes_unix_seconds() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let out = format_time(at);
        assert!(out.starts_with("2024-03-01T09:30:00+00:00"));
        assert!(out.ends_with("unix 1709285400)"));
    }

    #[test]
    fn test_parse_time_rejects_unknown_phrase() {
        assert!(parse_time("last tuesday").is_err());
        assert!(parse_time("5m").is_ok());
    }
}
