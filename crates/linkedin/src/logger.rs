use std::io::Write;

/// Install the process logger. `RUST_LOG` wins over `level`; the default is `warn`.
pub fn init(level: Option<log::Level>) {
    let level = level.unwrap_or(log::Level::Warn);
    let result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.to_level_filter().to_string()),
    )
    .format(|buf, record| {
        if record.level() <= log::Level::Info {
            writeln!(buf, "{}: {}", record.level(), record.args())
        } else {
            let mut target = record.target().to_string();
            if let Some(line_no) = record.line() {
                target.push(':');
                target.push_str(&line_no.to_string());
            }
            writeln!(buf, "{} {} - {}", record.level(), target, record.args())
        }
    })
    .try_init();

    if let Err(err) = result {
        eprintln!("logger already initialised: {err}");
    }
}
