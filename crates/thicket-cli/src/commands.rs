use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;

use thicket_sdk::{
    collect_subtree_ids, selectors, CommentBoard, CommentId, ThreadWalk, Timestamp, Vote,
};

use crate::cli::*;
use crate::config::{load_config, CONFIG_FILE};
use crate::render;
use crate::validate::validate_comment_text;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let out = Output { format: cli.format };
    let dir = cli.data_dir.as_path();
    match cli.command {
        Command::Post(args) => cmd_post(dir, out, args),
        Command::Reply(args) => cmd_reply(dir, out, args),
        Command::Edit(args) => cmd_edit(dir, out, args),
        Command::Delete(args) => cmd_delete(dir, out, args),
        Command::Collapse(args) => cmd_collapse(dir, out, args),
        Command::Like(args) => cmd_vote(dir, out, args, Ballot::Like),
        Command::Dislike(args) => cmd_vote(dir, out, args, Ballot::Dislike),
        Command::Show(args) => cmd_show(dir, out, args),
        Command::Stats(_) => cmd_stats(dir, out),
        Command::Clear(args) => cmd_clear(dir, out, args),
        Command::Config(_) => cmd_config(dir, out),
    }
}

#[derive(Clone, Copy)]
struct Output {
    format: OutputFormat,
}

impl Output {
    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn emit(&self, value: serde_json::Value) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(&value)?);
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Ballot {
    Like,
    Dislike,
}

fn open_board(dir: &Path) -> anyhow::Result<CommentBoard> {
    let config = load_config(dir)?;
    CommentBoard::open_dir(dir, &config)
        .with_context(|| format!("Failed to open comment store in {}", dir.display()))
}

/// Resolve a typed id, or a unique prefix of one, to a stored comment.
fn resolve_id(board: &CommentBoard, raw: &str) -> anyhow::Result<CommentId> {
    let wanted = CommentId::parse(raw)?;
    Ok(board.resolve(wanted.as_str())?)
}

fn cmd_post(dir: &Path, out: Output, args: PostArgs) -> anyhow::Result<()> {
    let text = validate_comment_text(&args.text)?;
    let mut board = open_board(dir)?;
    let id = board.add_comment(text).context("comment was not created")?;
    board.close();

    if out.json() {
        return out.emit(json!({ "id": id }));
    }
    println!("{} Posted {}", "✓".green().bold(), id.short_id().yellow());
    Ok(())
}

fn cmd_reply(dir: &Path, out: Output, args: ReplyArgs) -> anyhow::Result<()> {
    let text = validate_comment_text(&args.text)?;
    let mut board = open_board(dir)?;
    let parent = resolve_id(&board, &args.parent)?;
    let id = board
        .reply(&parent, text)
        .with_context(|| format!("parent {} disappeared", parent.short_id()))?;
    board.close();

    if out.json() {
        return out.emit(json!({ "id": id, "parent_id": parent }));
    }
    println!(
        "{} Replied {} under {}",
        "✓".green().bold(),
        id.short_id().yellow(),
        parent.short_id().yellow()
    );
    Ok(())
}

fn cmd_edit(dir: &Path, out: Output, args: EditArgs) -> anyhow::Result<()> {
    let text = validate_comment_text(&args.text)?;
    let mut board = open_board(dir)?;
    let id = resolve_id(&board, &args.id)?;
    board.edit_comment(&id, text);
    board.close();

    if out.json() {
        return out.emit(json!({ "id": id, "edited": true }));
    }
    println!("{} Edited {}", "✓".green().bold(), id.short_id().yellow());
    Ok(())
}

fn cmd_delete(dir: &Path, out: Output, args: DeleteArgs) -> anyhow::Result<()> {
    let mut board = open_board(dir)?;
    let id = resolve_id(&board, &args.id)?;
    let doomed = collect_subtree_ids(board.state(), &id).len();
    if !args.yes {
        bail!(
            "refusing to delete {} and {} repl{} without --yes",
            id.short_id(),
            doomed - 1,
            if doomed == 2 { "y" } else { "ies" }
        );
    }
    board.delete_comment(&id);
    board.close();

    if out.json() {
        return out.emit(json!({ "id": id, "removed": doomed }));
    }
    println!(
        "{} Deleted {} ({} comment{} removed)",
        "✓".green().bold(),
        id.short_id().yellow(),
        doomed,
        if doomed == 1 { "" } else { "s" }
    );
    Ok(())
}

fn cmd_collapse(dir: &Path, out: Output, args: TargetArgs) -> anyhow::Result<()> {
    let mut board = open_board(dir)?;
    let id = resolve_id(&board, &args.id)?;
    board.toggle_collapse(&id);
    let collapsed = board.state().get(&id).is_some_and(|n| n.is_collapsed());
    board.close();

    if out.json() {
        return out.emit(json!({ "id": id, "collapsed": collapsed }));
    }
    let what = if collapsed { "Collapsed" } else { "Expanded" };
    println!("{} {} {}", "✓".green().bold(), what, id.short_id().yellow());
    Ok(())
}

fn cmd_vote(dir: &Path, out: Output, args: TargetArgs, ballot: Ballot) -> anyhow::Result<()> {
    let mut board = open_board(dir)?;
    let id = resolve_id(&board, &args.id)?;
    let vote = match ballot {
        Ballot::Like => board.like(&id),
        Ballot::Dislike => board.dislike(&id),
    }
    .with_context(|| format!("comment {} disappeared", id.short_id()))?;
    let (likes, dislikes) = board
        .state()
        .get(&id)
        .map_or((0, 0), |n| (n.likes, n.dislikes));
    board.close();

    if out.json() {
        return out.emit(json!({
            "id": id,
            "my_vote": vote,
            "likes": likes,
            "dislikes": dislikes,
        }));
    }
    let what = match vote {
        Vote::Like => "Liked".green(),
        Vote::Dislike => "Disliked".red(),
        Vote::None => "Vote removed from".normal(),
    };
    println!(
        "{} {} {}  {} {}",
        "✓".green().bold(),
        what,
        id.short_id().yellow(),
        format!("+{likes}").green(),
        format!("-{dislikes}").red()
    );
    Ok(())
}

fn cmd_show(dir: &Path, out: Output, args: ShowArgs) -> anyhow::Result<()> {
    let board = open_board(dir)?;
    let state = board.state();
    let target: Option<CommentId> = args
        .id
        .as_deref()
        .map(|prefix| resolve_id(&board, prefix))
        .transpose()?;

    let walk = match &target {
        Some(id) => ThreadWalk::subtree(state, id),
        None => ThreadWalk::visible(state),
    };
    let walk = if args.all { walk.expand_collapsed() } else { walk };

    if out.json() {
        let views = render::comment_views(board.votes(), walk);
        out.emit(json!({ "comments": views }))?;
    } else if !selectors::has_comments(state) {
        println!("No comments yet. Start one with {}.", "thicket post".bold());
    } else {
        for line in render::render_walk(state, board.votes(), walk, Timestamp::now()) {
            println!("{line}");
        }
    }
    board.close();
    Ok(())
}

fn cmd_stats(dir: &Path, out: Output) -> anyhow::Result<()> {
    let board = open_board(dir)?;
    let state = board.state();
    let total = selectors::total_count(state);
    let roots = selectors::root_comments(state).count();
    let (likes, dislikes) = state
        .by_id
        .values()
        .fold((0i64, 0i64), |(l, d), n| (l + n.likes, d + n.dislikes));
    let collapsed = state.by_id.values().filter(|n| n.is_collapsed()).count();
    let my_votes = board.votes().len();
    board.close();

    if out.json() {
        return out.emit(json!({
            "comments": total,
            "threads": roots,
            "replies": total - roots,
            "collapsed": collapsed,
            "likes": likes,
            "dislikes": dislikes,
            "my_votes": my_votes,
        }));
    }
    println!(
        "Comments:  {} ({} threads, {} replies)",
        total.to_string().bold(),
        roots,
        total - roots
    );
    println!("Collapsed: {collapsed}");
    println!("Votes:     {} {}", format!("+{likes}").green(), format!("-{dislikes}").red());
    println!("Yours:     {my_votes}");
    Ok(())
}

fn cmd_clear(dir: &Path, out: Output, args: ClearArgs) -> anyhow::Result<()> {
    let mut board = open_board(dir)?;
    let total = selectors::total_count(board.state());
    if !args.yes {
        bail!("refusing to clear {total} comment(s) without --yes");
    }
    board.clear_all();
    board.close();

    if out.json() {
        return out.emit(json!({ "removed": total }));
    }
    println!("{} Cleared {} comment(s)", "✓".green().bold(), total);
    Ok(())
}

fn cmd_config(dir: &Path, out: Output) -> anyhow::Result<()> {
    let config = load_config(dir)?;
    let keys = config.keys();
    let file = dir.join(CONFIG_FILE);

    if out.json() {
        return out.emit(json!({
            "data_dir": dir,
            "config_file": file,
            "config_file_present": file.exists(),
            "namespace": config.namespace,
            "debounce_ms": config.debounce_ms,
            "keys": { "comments": keys.comments, "user_votes": keys.user_votes },
        }));
    }
    let source = if file.exists() { "" } else { " (defaults)" };
    println!("Data dir:    {}", dir.display().to_string().bold());
    println!("Config file: {}{}", file.display(), source.dimmed());
    println!("namespace   = {}", config.namespace.cyan());
    println!("debounce_ms = {}", config.debounce_ms.to_string().cyan());
    println!("Keys:        {}, {}", keys.comments, keys.user_votes);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use thicket_sdk::{InMemorySnapshotStore, PersistConfig};

    fn board() -> CommentBoard {
        CommentBoard::open(Arc::new(InMemorySnapshotStore::new()), &PersistConfig::default())
    }

    #[test]
    fn resolve_id_accepts_prefixes() {
        let mut b = board();
        let id = b.add_comment("hello").unwrap();
        assert_eq!(resolve_id(&b, id.short_id()).unwrap(), id);
    }

    #[test]
    fn resolve_id_rejects_malformed_input() {
        let mut b = board();
        b.add_comment("hello").unwrap();
        let err = resolve_id(&b, "").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
        let err = resolve_id(&b, "ab cd").unwrap_err();
        assert!(err.to_string().contains("whitespace"));
        assert!(resolve_id(&b, "zzzz").is_err());
    }
}
