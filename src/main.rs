//! Docker 控制面板主入口

use docker_dashboard::{
    config::AppConfig, handlers::health, middleware::AppState, routes,
    services::SessionService, ssh::SshConnector, telemetry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("docker-dashboard {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Docker dashboard starting...");

    // 3. 会话服务（启动时未连接）
    let connector = Arc::new(SshConnector::new(config.ssh.connect_timeout()));
    let session_service = Arc::new(SessionService::new(connector, &config.ssh));

    let app_state = Arc::new(AppState {
        session_service: session_service.clone(),
    });

    // 4. 构建路由
    let app = routes::create_router(app_state);

    // 5. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 6. 进程退出前关闭 SSH 会话
    let grace = Duration::from_secs(config.server.graceful_shutdown_timeout_secs);
    if tokio::time::timeout(grace, session_service.shutdown())
        .await
        .is_err()
    {
        tracing::warn!("SSH session did not close before the shutdown timeout");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }
}

/// 打印帮助信息
fn print_help() {
    println!("docker-dashboard {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: docker-dashboard [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  DOCKDASH_SERVER__ADDR               监听地址（默认 0.0.0.0:8501）");
    println!("  DOCKDASH_LOGGING__LEVEL             日志级别（默认 info）");
    println!("  DOCKDASH_LOGGING__FORMAT            日志格式 json|pretty（默认 pretty）");
    println!("  DOCKDASH_SSH__DEFAULT_PORT          默认 SSH 端口（默认 22）");
    println!("  DOCKDASH_SSH__CONNECT_TIMEOUT_SECS  连接超时（默认 10）");
    println!("  DOCKDASH_SSH__COMMAND_TIMEOUT_SECS  命令超时（默认 300）");
}
