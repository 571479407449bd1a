//! Post command — write one message record to a room.

use crate::config::{self, Config};
use anyhow::{bail, Context, Result};
use clap::Args;
use dropchat_core::{spool, Attachment, AttachmentDisplay};
use std::path::PathBuf;

/// Arguments for `dropchat post`
#[derive(Args, Debug)]
pub struct PostArgs {
    /// Room to post into
    pub room: String,

    /// Message text
    pub text: String,

    /// Sender display name (defaults to DROPCHAT_USER or config.toml)
    #[arg(long = "as")]
    pub user: Option<String>,

    /// Id of the message this one replies to
    #[arg(long = "reply-to", value_name = "ID")]
    pub reply_to: Option<String>,

    /// Attachment reference, repeatable: REL_PATH:MIME[:inline|link]
    #[arg(long = "attach", value_name = "REL_PATH:MIME[:inline|link]")]
    pub attach: Vec<String>,

    /// Print the created record as JSON instead of a summary line
    #[arg(long)]
    pub json: bool,

    /// Shared root directory (overrides DROPCHAT_ROOT and config.toml)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

/// Execute the post command.
///
/// # Errors
///
/// Fails on invalid input (empty text, malformed attachment spec) or when
/// the share is unreachable.
pub fn execute(args: PostArgs) -> Result<()> {
    let config = Config::load();
    let root = config::resolve_root(args.root, &config)?;
    let user = config::resolve_user(args.user, &config)?;

    let attachments = args
        .attach
        .iter()
        .map(|spec| parse_attachment(spec))
        .collect::<Result<Vec<_>>>()?;

    let record = spool::post(&root, &args.room, &user, &args.text, attachments, args.reply_to)
        .with_context(|| format!("Failed to post to room '{}'", args.room))?;

    if args.json {
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("Posted {} to '{}' at {}", record.id, record.room, record.ts);
    }
    Ok(())
}

/// Parse `REL_PATH:MIME[:inline|link]` into an attachment reference.
fn parse_attachment(spec: &str) -> Result<Attachment> {
    let parts: Vec<&str> = spec.split(':').collect();
    let (rel_path, mime, display) = match parts.as_slice() {
        [rel_path, mime] => (*rel_path, *mime, AttachmentDisplay::Link),
        [rel_path, mime, "inline"] => (*rel_path, *mime, AttachmentDisplay::Inline),
        [rel_path, mime, "link"] => (*rel_path, *mime, AttachmentDisplay::Link),
        _ => bail!("Invalid attachment spec '{spec}'. Expected REL_PATH:MIME[:inline|link]"),
    };
    if rel_path.is_empty() || mime.is_empty() {
        bail!("Invalid attachment spec '{spec}'. Expected REL_PATH:MIME[:inline|link]");
    }
    Ok(Attachment {
        rel_path: rel_path.to_string(),
        mime: mime.to_string(),
        display,
    })
}
