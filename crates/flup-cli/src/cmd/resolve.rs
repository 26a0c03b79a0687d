//! Resolve command

use anyhow::Result;
use crossterm::style::Stylize;

use super::{Context, version_request};
use crate::RequestArgs;
use flup_core::install::Installer;

/// Print the release a request resolves to without installing it
pub async fn resolve(ctx: &Context, args: &RequestArgs, json: bool) -> Result<()> {
    let request = version_request(args)?;
    let installer = Installer::new(&ctx.settings, ctx.platform, ctx.arch)?;
    let release = installer.resolve(&request.version, &request.channel).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&release)?);
        return Ok(());
    }

    let lw = 10;
    println!("  {:<lw$}{}", "version", release.version.as_str().bold());
    println!("  {:<lw$}{}", "channel", release.channel);
    if release.raw_version != release.version {
        println!("  {:<lw$}{}", "published", release.raw_version.as_str().dark_grey());
    }
    println!("  {:<lw$}{}", "archive", release.download_url);

    Ok(())
}
