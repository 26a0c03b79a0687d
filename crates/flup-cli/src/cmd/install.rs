//! Install command

use anyhow::{Context as _, Result};
use crossterm::style::Stylize;

use super::{Context, version_request};
use crate::RequestArgs;
use flup_core::cache::ToolCache;
use flup_core::env::{ExportTarget, SdkEnvironment, export};
use flup_core::install::{Installer, TOOL_NAME, cache_key};

/// Install the requested SDK and export it to the environment
pub async fn install(ctx: &Context, args: &RequestArgs, dry_run: bool) -> Result<()> {
    let request = version_request(args)?;
    let installer = Installer::new(&ctx.settings, ctx.platform, ctx.arch)
        .context("Failed to initialise installer")?;

    if dry_run {
        let release = installer.resolve(&request.version, &request.channel).await?;
        let key = cache_key(&release.version, &request.channel);
        let dest = ToolCache::new(&ctx.settings.tool_cache).tool_dir(TOOL_NAME, &key, ctx.arch);

        eprintln!(
            "Would install Flutter {} ({})",
            release.version.as_str().bold(),
            release.channel
        );
        eprintln!("  from {}", release.download_url);
        eprintln!("  into {}", dest.display());
        return Ok(());
    }

    let installation = installer.install(&request.version, &request.channel).await?;

    let status = if installation.cached {
        "cached".dark_grey()
    } else {
        "installed".green()
    };
    eprintln!(
        "Flutter {} ({}) {status} at {}",
        installation.release.version.as_str().bold(),
        installation.release.channel,
        installation.sdk_root.display()
    );

    let env = SdkEnvironment::for_sdk(&installation.sdk_root);
    let target = ExportTarget::detect(|key| std::env::var(key).ok());
    let lines = export(&env, &target).context("Failed to export SDK environment")?;

    // Shell exports go to stdout so the output can be eval'd
    for line in lines {
        println!("{line}");
    }

    Ok(())
}
