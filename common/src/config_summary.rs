use dieroll_core::config::Config;

/// Build a list of key/value pairs summarizing the effective configuration.
pub fn create_config_summary_entries(config: &Config) -> Vec<(&'static str, String)> {
    let timing = &config.timing;
    let haptics = &config.haptics;
    vec![
        ("home", config.dieroll_home.display().to_string()),
        (
            "profile",
            config
                .active_profile
                .clone()
                .unwrap_or_else(|| "(none)".to_string()),
        ),
        ("title", config.title.clone()),
        ("roll duration", format_millis(timing.duration.as_millis())),
        ("shuffle interval", format_millis(timing.shuffle_interval.as_millis())),
        (
            "spin",
            format!(
                "{} x {}",
                timing.spin_cycles,
                format_millis(timing.spin_cycle.as_millis())
            ),
        ),
        ("frame interval", format_millis(timing.frame_interval.as_millis())),
        (
            "seed",
            config
                .seed
                .map(|seed| seed.to_string())
                .unwrap_or_else(|| "random".to_string()),
        ),
        ("haptics", if haptics.enabled { "on" } else { "off" }.to_string()),
        ("haptic impact", haptics.request.style.to_string()),
        (
            "vibrate fallback",
            haptics.request.options.enable_vibrate_fallback.to_string(),
        ),
        (
            "ignore system settings",
            haptics.request.options.ignore_system_settings.to_string(),
        ),
    ]
}

fn format_millis(millis: u128) -> String {
    format!("{millis}ms")
}
