//! task.completed → 태스크 디렉토리 기록 및 아카이브 (end-to-end)

use aos_foundation::event::task;
use aos_foundation::{AosConfig, EventBus, TokenUsage};
use aos_host::{
    HostServices, LocalHost, NoticeLevel, ProviderSettingsManager, RecordingNotifier,
};
use aos_tasklog::{generate_task_config, AosExtension, TaskLogOutcome};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    root: std::path::PathBuf,
    workspace: std::path::PathBuf,
    host: Arc<LocalHost>,
    notifier: RecordingNotifier,
    services: HostServices,
}

async fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let root = temp.path().to_path_buf();
    let workspace = root.join("projects").join("demo");
    std::fs::create_dir_all(&workspace).unwrap();

    let host = Arc::new(LocalHost::new(&workspace));
    ProviderSettingsManager::import(
        host.as_ref(),
        json!({
            "currentApiConfigName": "default",
            "apiConfigs": {
                "default": { "id": "d", "apiProvider": "anthropic", "apiModelId": "claude-sonnet-4-20250514" }
            }
        }),
    )
    .await
    .unwrap();

    let notifier = RecordingNotifier::new();
    let services = HostServices::local(host.clone(), Arc::new(notifier.clone()));
    Fixture {
        _temp: temp,
        root,
        workspace,
        host,
        notifier,
        services,
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn quiet_config() -> AosConfig {
    AosConfig::default().watch_prompts(false).watch_settings(false)
}

fn usage() -> TokenUsage {
    TokenUsage {
        total_tokens_in: 1200,
        total_tokens_out: 340,
        total_cost: 0.02,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_completed_task_archived_to_workspace_and_data_pool() {
    let fx = fixture().await;
    let pool = fx.root.join("aos-data-pool");
    std::fs::create_dir_all(&pool).unwrap();
    fx.host.create_task("T1").await.unwrap();

    let bus = Arc::new(EventBus::new());
    let ext = AosExtension::activate(fx.services.clone(), quiet_config(), bus.clone())
        .await
        .unwrap();

    bus.publish(task::completed("T1", &usage())).await;

    let expected = generate_task_config(&fx.services).await.unwrap();
    let local = fx.workspace.join(".aos/task-log/entry/T1");
    let pooled = pool.join("task-log/entry/T1");

    for dir in [&local, &pooled] {
        let prompt = read_json(&dir.join("system_prompt.json"));
        assert_eq!(prompt.as_str(), expected.system_prompt.as_deref());

        let provider = read_json(&dir.join("api_provider.json"));
        assert_eq!(provider, json!({ "name": "anthropic", "model": "claude-sonnet-4-20250514" }));

        for file in ["roo-code-settings.json", "env_vars.json", "host.json", "vscode_workspace.json"] {
            assert!(dir.join(file).is_file(), "{} missing in {}", file, dir.display());
        }
    }

    let workspace_json = read_json(&local.join("vscode_workspace.json"));
    assert_eq!(workspace_json[0]["name"], "demo");

    let lines = ext.channel().lines();
    assert!(lines.iter().any(|l| l.starts_with("Task configuration saved to ")));
    assert_eq!(
        lines.iter().filter(|l| l.starts_with("Task directory copied to ")).count(),
        2
    );
    assert!(fx.notifier.messages(NoticeLevel::Error).is_empty());
    ext.shutdown().await;
}

#[tokio::test]
async fn test_completed_task_without_data_pool_keeps_local_archive() {
    let fx = fixture().await;
    fx.host.create_task("T2").await.unwrap();

    let bus = Arc::new(EventBus::new());
    let ext = AosExtension::activate(fx.services.clone(), quiet_config(), bus.clone())
        .await
        .unwrap();

    let outcome = ext.logger().handle_completed("T2", Some(&usage())).await.unwrap();
    let local = fx.workspace.join(".aos/task-log/entry/T2");
    assert_eq!(outcome, TaskLogOutcome::PartiallyArchived { local: local.clone() });
    assert!(local.join("system_prompt.json").is_file());

    let expected = format!(
        "Folder \"aos-data-pool\" not found any where in parent of workspace: {}",
        fx.workspace.display()
    );
    assert!(ext.channel().contains(&expected));
    assert_eq!(fx.notifier.messages(NoticeLevel::Error), vec![expected]);

    // 버스를 통한 경로도 패닉 없이 끝나야 함
    bus.publish(task::completed("T2", &usage())).await;
    ext.shutdown().await;
}

#[tokio::test]
async fn test_recursive_archive_follows_config() {
    let fx = fixture().await;
    let handle = fx.host.create_task("T3").await.unwrap();
    std::fs::create_dir_all(handle.task_dir_path.join("checkpoints")).unwrap();
    std::fs::write(handle.task_dir_path.join("checkpoints/1.json"), "{}").unwrap();

    let bus = Arc::new(EventBus::new());
    let mut config = quiet_config();
    config.archive_recursive = true;
    let ext = AosExtension::activate(fx.services.clone(), config, bus)
        .await
        .unwrap();

    ext.logger().handle_completed("T3", None).await.unwrap();
    assert!(fx
        .workspace
        .join(".aos/task-log/entry/T3/checkpoints/1.json")
        .is_file());
    ext.shutdown().await;
}
