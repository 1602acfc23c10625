use std::io::Write;

/// Installs the global logger. `RUST_LOG` overrides the default `info` filter.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let now = chrono::Local::now();
            writeln!(
                buf,
                "[{}] {:<5} {}: {}",
                now.format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
