//! Annotation session walkthrough
//!
//! Builds a stand-in render of a reviewed markdown file, loads comments
//! into a session (from the review server when one is running, canned
//! ones otherwise), captures a selection, and prints the resulting
//! annotation view.
//!
//! Run with: `cargo run --example annotate`

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marginalia::config::Config;
use marginalia::doc::{Boundary, Document, DocumentBuilder, Selection};
use marginalia::session::DocumentSession;
use marginalia::store::{Comment, CommentId, CommentStore, HttpCommentStore};

/// What the renderer would hand us for a short markdown file.
fn sample_render() -> Document {
    let mut builder = DocumentBuilder::new();
    builder.begin_block("h1", 1, 1).text("Deployment plan").end();
    builder
        .begin_block("p", 3, 4)
        .text("The rollout happens in two waves, staging first and production a day later.")
        .end();
    builder.begin_block("ul", 6, 7);
    builder.begin_block("li", 6, 6).text("wave one: staging").end();
    builder.begin_block("li", 7, 7).text("wave two: production").end();
    builder.end();
    builder.finish()
}

fn sample_comments(config: &Config) -> Vec<Comment> {
    let base = Comment {
        id: CommentId(1),
        project_directory: config.review.project_directory.clone(),
        file_path: config.review.file_path.clone(),
        line_start: Some(3),
        line_end: Some(4),
        selected_text: "staging first".to_string(),
        comment_text: "Is one day between waves enough?".to_string(),
        created_at: Utc::now(),
    };
    let stale = Comment {
        id: CommentId(2),
        line_start: Some(6),
        line_end: Some(6),
        selected_text: "wave zero: smoke tests".to_string(),
        comment_text: "This line was rewritten since the comment was made.".to_string(),
        ..base.clone()
    };
    vec![base, stale]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marginalia=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting Marginalia v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Review server: {}", config.store.base_url);
    tracing::info!(
        "Reviewing {} in {}",
        config.review.file_path,
        config.review.project_directory
    );

    let mut session = DocumentSession::new(
        config.review.project_directory.clone(),
        config.review.file_path.clone(),
        sample_render(),
    );

    // Prefer live comments; fall back to canned ones when no server is up.
    let store = HttpCommentStore::from_config(&config.store)?;
    let comments = match store
        .list(session.project_directory(), session.file_path())
        .await
    {
        Ok(comments) => comments,
        Err(err) => {
            tracing::warn!("Review server not reachable ({}), using sample comments", err);
            sample_comments(&config)
        }
    };

    let report = session.load_comments(comments);
    tracing::info!(
        "Materialized {} highlights, {} comments left unresolved",
        report.highlighted,
        report.unresolved.len()
    );

    // Capture a selection the way a UI would hand one over.
    let node = session
        .document()
        .text_nodes()
        .nth(1)
        .context("render has no paragraph text")?;
    let (lines, text) = {
        let captured = session.select(&Selection::new(
            Boundary::new(node, 4),
            Boundary::new(node, 26),
        ))?;
        (
            (captured.anchor.line_start, captured.anchor.line_end),
            captured.text().to_string(),
        )
    };
    tracing::info!("Captured {:?} on lines {:?}", text, lines);

    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}
