use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn no_env(_: &str) -> Option<String> {
    None
}

fn temp_config(tag: &str, contents: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("photo_grid_config_{tag}_{suffix}.toml"));
    fs::write(&path, contents).expect("write config");
    path
}

#[test]
fn missing_file_yields_defaults() {
    let settings = load_settings_from(Path::new("/nonexistent/photo_grid.toml"), no_env);
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.tick_interval(), Duration::from_millis(300));
    assert_eq!(settings.equality, RevisionEquality::LengthOnly);
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config(
        "file",
        r#"
api_base = "http://127.0.0.1:9000"
tick_interval_ms = 50
variant = "native"
equality = "exact"
"#,
    );

    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings.api_base, "http://127.0.0.1:9000");
    assert_eq!(settings.tick_interval_ms, 50);
    assert_eq!(settings.variant, PresentationVariant::Native);
    assert_eq!(settings.equality, RevisionEquality::Exact);
    assert_eq!(settings.image_host, DEFAULT_IMAGE_HOST);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_file_and_prefixed_key_wins() {
    let path = temp_config("env", "api_base = \"http://from-file\"\n");
    let settings = load_settings_from(&path, |key| match key {
        "PHOTO_GRID_API_BASE" => Some("http://plain-env".to_string()),
        "APP__API_BASE" => Some("http://prefixed-env".to_string()),
        "APP__TICK_INTERVAL_MS" => Some("120".to_string()),
        _ => None,
    });

    assert_eq!(settings.api_base, "http://prefixed-env");
    assert_eq!(settings.tick_interval_ms, 120);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn invalid_values_are_ignored() {
    let settings = load_settings_from(Path::new("/nonexistent/photo_grid.toml"), |key| {
        match key {
            "APP__TICK_INTERVAL_MS" => Some("0".to_string()),
            "APP__VARIANT" => Some("carousel".to_string()),
            "APP__EQUALITY" => Some("sometimes".to_string()),
            _ => None,
        }
    });
    assert_eq!(settings, Settings::default());
}

#[test]
fn unreadable_file_keeps_defaults() {
    let path = temp_config("broken", "this is = = not toml");
    let settings = load_settings_from(&path, no_env);
    assert_eq!(settings, Settings::default());
    fs::remove_file(path).expect("cleanup");
}
