use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 依設定的層級組出過濾規則；`--verbose` 至少開到 debug
fn cli_directive(level: &str, verbose: bool) -> String {
    if verbose && !matches!(level, "trace" | "debug") {
        "dept_admin=debug,info".to_string()
    } else {
        format!("dept_admin={}", level)
    }
}

/// RUST_LOG 優先於設定檔
fn env_or(directive: String) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

pub fn init_cli_logger(level: &str, verbose: bool) {
    tracing_subscriber::registry()
        .with(env_or(cli_directive(level, verbose)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(level: &str) {
    tracing_subscriber::registry()
        .with(env_or(format!("dept_admin={}", level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(), // 給日誌收集器使用的結構化輸出
        )
        .init();
}
