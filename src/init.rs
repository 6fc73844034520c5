use env_logger::Env;

/// 初始化日誌
///
/// 預設只顯示警告以上，`--verbose` 時顯示 debug；`RUST_LOG` 可覆蓋。
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}
