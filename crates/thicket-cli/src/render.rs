use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use serde::Serialize;

use thicket_sdk::{
    selectors, CommentNode, CommentsState, ThreadWalk, Timestamp, Vote, VoteLedger,
};

const MINUTE_MS: u64 = 60_000;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Human age of `then` as seen at `now`: `just now`, `5m ago`, `3h ago`,
/// `2d ago`, or a local date once a week has passed.
pub fn relative_time(then: Timestamp, now: Timestamp) -> String {
    let elapsed = now.millis_since(then);
    if elapsed < MINUTE_MS {
        "just now".to_string()
    } else if elapsed < HOUR_MS {
        format!("{}m ago", elapsed / MINUTE_MS)
    } else if elapsed < DAY_MS {
        format!("{}h ago", elapsed / HOUR_MS)
    } else if elapsed < 7 * DAY_MS {
        format!("{}d ago", elapsed / DAY_MS)
    } else {
        local_date(then)
    }
}

fn local_date(ts: Timestamp) -> String {
    i64::try_from(ts.as_millis())
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|utc| utc.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown date".to_string())
}

/// RFC 3339 rendering for machine-readable output.
pub fn iso_time(ts: Timestamp) -> Option<String> {
    let ms = i64::try_from(ts.as_millis()).ok()?;
    DateTime::<Utc>::from_timestamp_millis(ms).map(|utc| utc.to_rfc3339())
}

/// Make untrusted text safe to print on one terminal line. Whitespace
/// controls become spaces; every other control character (including ESC)
/// becomes U+FFFD.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '\u{FFFD}',
            c => c,
        })
        .collect()
}

fn vote_marker(vote: Vote) -> String {
    match vote {
        Vote::Like => " (you liked)".green().to_string(),
        Vote::Dislike => " (you disliked)".red().to_string(),
        Vote::None => String::new(),
    }
}

/// One rendered comment: a header line and the text line, indented by depth.
pub fn comment_lines(
    state: &CommentsState,
    node: &CommentNode,
    depth: usize,
    vote: Vote,
    now: Timestamp,
) -> [String; 2] {
    let indent = "  ".repeat(depth);
    let mut header = format!(
        "{indent}{} {} {}",
        "●".cyan(),
        node.id.short_id().yellow(),
        relative_time(node.created_at, now).dimmed(),
    );
    if node.is_edited() {
        header.push_str(&format!(" {}", "(edited)".dimmed()));
    }
    header.push_str(&format!(
        "  {} {}{}",
        format!("+{}", node.likes).green(),
        format!("-{}", node.dislikes).red(),
        vote_marker(vote),
    ));
    if node.is_collapsed() && node.has_replies() {
        let hidden = selectors::reply_count(state, &node.id);
        let noun = if hidden == 1 { "reply" } else { "replies" };
        header.push_str(&format!(" {}", format!("[{hidden} {noun} hidden]").blue()));
    }
    let body = format!("{indent}  {}", sanitize(&node.text));
    [header, body]
}

/// Render a whole walk as printable lines.
pub fn render_walk(
    state: &CommentsState,
    votes: &VoteLedger,
    walk: ThreadWalk<'_>,
    now: Timestamp,
) -> Vec<String> {
    walk.flat_map(|(depth, node)| {
        comment_lines(state, node, depth, votes.get_vote(&node.id), now)
    })
    .collect()
}

/// Machine-readable view of one comment.
#[derive(Debug, Serialize)]
pub struct CommentView<'a> {
    pub id: &'a str,
    pub parent_id: Option<&'a str>,
    pub depth: usize,
    pub text: &'a str,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub likes: i64,
    pub dislikes: i64,
    pub collapsed: bool,
    pub replies: usize,
    pub my_vote: Vote,
}

pub fn comment_views<'a>(votes: &VoteLedger, walk: ThreadWalk<'a>) -> Vec<CommentView<'a>> {
    walk.map(|(depth, node)| CommentView {
        id: node.id.as_str(),
        parent_id: node.parent_id.as_ref().map(|p| p.as_str()),
        depth,
        text: &node.text,
        created_at: iso_time(node.created_at),
        updated_at: node.updated_at.and_then(iso_time),
        likes: node.likes,
        dislikes: node.dislikes,
        collapsed: node.is_collapsed(),
        replies: node.child_ids.len(),
        my_vote: votes.get_vote(&node.id),
    })
    .collect()
}
