use std::time::Duration;

use log::{error, info};

use crate::{model::ARMORY_REPOSITORIES, sdk::RepoStatus, SdkManager};

const GIT_DOWNLOAD_URL: &str = "https://git-scm.com/downloads";
const HELP_URL: &str = "https://github.com/armory3d/armory/wiki/gitversion";
const PROGRESS_INTERVAL: Duration = Duration::from_secs(30);

/// Handler to install and update commands.
/// Returns whether every repository was fetched.
pub async fn do_install(manager: &SdkManager) -> anyhow::Result<bool> {
    let location = manager.location()?;
    if location.exists() {
        info!("Updating Armory SDK in {}", location.root().display());
    } else {
        info!(
            "Setting up Armory SDK in {}, the directory will be created",
            location.root().display()
        );
    }

    let handle = manager.install(|report| {
        if report.is_success() {
            info!("Armory SDK download completed, please restart Blender");
        } else {
            error!("Failed downloading Armory SDK, check the log for details");
        }
    })?;

    let progress = handle.tracker();
    let wait = handle.wait();
    tokio::pin!(wait);
    let report = loop {
        tokio::select! {
            report = &mut wait => break report?,
            _ = tokio::time::sleep(PROGRESS_INTERVAL) => {
                let job = progress.snapshot();
                info!("{} of {} repositories finished", job.completed(), job.total());
            }
        }
    };

    Ok(report.is_success())
}

/// Handler to restore command
pub fn do_restore(manager: &SdkManager) -> anyhow::Result<bool> {
    let report = manager.restore()?;
    if report.restored.is_empty() && report.is_success() {
        info!("No backup found, nothing to restore");
    } else if report.is_success() {
        info!("Restored stable version");
    }
    Ok(report.is_success())
}

/// Handler to status command
pub fn do_status(manager: &SdkManager) -> anyhow::Result<()> {
    let location = manager.location()?;
    println!("SDK: {}", location.root().display());
    for status in manager.status()? {
        println!("{}", describe(&status));
    }
    if !location.exists() {
        println!(
            "The SDK is not installed, run `armsdk install` to download {} repositories",
            ARMORY_REPOSITORIES.len()
        );
    }
    Ok(())
}

/// Handler to check command
pub fn do_check(manager: &SdkManager) -> bool {
    match manager.check_git() {
        Ok(version) => {
            println!("{version}");
            true
        }
        Err(error) => {
            error!(
                "Git test failed: {}. Make sure git is installed ({}) or is working correctly, see {}",
                error, GIT_DOWNLOAD_URL, HELP_URL
            );
            false
        }
    }
}

fn describe(status: &RepoStatus) -> String {
    let state = match (status.installed, &status.head) {
        (true, Some(head)) => format!("installed at {head}"),
        (true, None) => "installed".to_owned(),
        (false, _) => "missing".to_owned(),
    };
    let backup = if status.backup { ", backup available" } else { "" };
    format!("{:<20} {}{}", status.spec.local_path, state, backup)
}
