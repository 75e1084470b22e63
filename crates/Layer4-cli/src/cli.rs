//! Command implementations over the local host

use anyhow::{bail, Context};
use aos_foundation::{copy_dir, locate_folder, AosConfig, EventBus};
use aos_host::{HostServices, LocalHost, SessionHost, TracingNotifier};
use aos_tasklog::{
    gather_host_info_and_write, load_history, log_workspace_folders, write_env_vars,
    AosExtension, TaskLogOutcome, ENV_VARS_FILE, HOST_FILE, WORKSPACE_FILE,
};
use std::path::Path;
use std::sync::Arc;

fn local_services(workspace: &Path) -> (Arc<LocalHost>, HostServices) {
    let host = Arc::new(LocalHost::new(workspace));
    let services = HostServices::local(host.clone(), Arc::new(TracingNotifier));
    (host, services)
}

/// 감시기 없이 활성화 (단발성 명령용)
async fn activate_once(workspace: &Path) -> anyhow::Result<AosExtension> {
    let config = AosConfig::load(workspace)?
        .watch_prompts(false)
        .watch_settings(false);
    let (_, services) = local_services(workspace);
    Ok(AosExtension::activate(services, config, Arc::new(EventBus::new())).await?)
}

pub async fn snapshot(workspace: &Path, dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("cannot create {}", dir.display()))?;

    let (host, _) = local_services(workspace);
    write_env_vars(&dir.join(ENV_VARS_FILE)).await?;
    gather_host_info_and_write(&dir.join(HOST_FILE)).await?;
    let folders = host.workspace_folders();
    log_workspace_folders(folders.as_deref(), &dir.join(WORKSPACE_FILE)).await?;

    println!("Snapshots written to {}", dir.display());
    Ok(())
}

pub async fn locate(from: &Path, name: &str) -> anyhow::Result<()> {
    match locate_folder(from, name).await {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => bail!(
            "Folder \"{}\" not found any where in parent of: {}",
            name,
            from.display()
        ),
    }
}

pub async fn copy(src: &Path, dst: &Path, recursive: bool) -> anyhow::Result<()> {
    copy_dir(src, dst, recursive).await?;
    println!("Copied {} -> {}", src.display(), dst.display());
    Ok(())
}

pub async fn export_settings(workspace: &Path, file: &Path) -> anyhow::Result<()> {
    let (_, services) = local_services(workspace);
    aos_tasklog::export_settings(&services, file).await?;
    println!("Settings exported to {}", file.display());
    Ok(())
}

pub async fn import_settings(workspace: &Path, file: &Path) -> anyhow::Result<()> {
    let (_, services) = local_services(workspace);
    if !aos_tasklog::import_settings(&services, file).await? {
        bail!("could not import settings from {}", file.display());
    }
    println!("Settings imported from {}", file.display());
    Ok(())
}

pub async fn log_task(workspace: &Path, task_id: &str) -> anyhow::Result<()> {
    let ext = activate_once(workspace).await?;
    let outcome = ext.logger().handle_completed(task_id, None).await;
    ext.shutdown().await;

    match outcome? {
        TaskLogOutcome::Archived { local, data_pool } => {
            println!("Archived to {}", local.display());
            println!("Archived to {}", data_pool.display());
            Ok(())
        }
        TaskLogOutcome::PartiallyArchived { local } => {
            println!("Archived to {} (no data pool)", local.display());
            Ok(())
        }
        TaskLogOutcome::Failed { reason } => bail!("task log failed: {}", reason),
    }
}

pub async fn prompt(workspace: &Path) -> anyhow::Result<()> {
    let ext = activate_once(workspace).await?;
    let config = ext.debug_system_prompt().await;
    ext.shutdown().await;

    let config = config?;
    println!(
        "[{} / {}]\n",
        config.api_provider.name, config.api_provider.model
    );
    println!("{}", config.system_prompt.unwrap_or_default());
    Ok(())
}

pub async fn remove_allowed_command(workspace: &Path, command: &str) -> anyhow::Result<()> {
    let (_, services) = local_services(workspace);
    if aos_tasklog::remove_allowed_command(&services, command).await? {
        println!("Removed \"{}\" from allowed commands", command);
    } else {
        println!("\"{}\" is not in allowed commands", command);
    }
    Ok(())
}

pub async fn export_md(history: &Path, out: Option<&Path>) -> anyhow::Result<()> {
    let messages = load_history(history)
        .await
        .with_context(|| format!("cannot read {}", history.display()))?;
    let path = aos_tasklog::export_task(&messages, chrono::Local::now(), out).await?;
    println!("{}", path.display());
    Ok(())
}

pub async fn run(workspace: &Path) -> anyhow::Result<()> {
    let config = AosConfig::load(workspace)?;
    let (_, services) = local_services(workspace);
    let bus = Arc::new(EventBus::new());
    let ext = AosExtension::activate(services, config, bus).await?;

    println!(
        "AOS running on {} ({} watchers). Press Ctrl-C to stop.",
        workspace.display(),
        ext.watchers().len()
    );
    tokio::signal::ctrl_c().await?;
    ext.shutdown().await;
    Ok(())
}
