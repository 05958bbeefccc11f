use super::*;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_without_file_or_env() {
    let settings = load_settings_from(None, no_env);
    assert_eq!(settings, ClientSettings::default());
    assert_eq!(settings.page_size, 10);
}

#[test]
fn file_values_override_defaults() {
    let raw = r#"
        api_base_url = "https://rx.example.org/"
        page_size = 25
        request_timeout_secs = 4
    "#;
    let settings = load_settings_from(Some(raw), no_env);
    assert_eq!(settings.api_base_url, "https://rx.example.org");
    assert_eq!(settings.page_size, 25);
    assert_eq!(settings.request_timeout(), Duration::from_secs(4));
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let raw = r#"api_base_url = "http://file:8080""#;
    let settings = load_settings_from(Some(raw), |name| match name {
        "RX_API_BASE_URL" => Some("http://env:8080".to_string()),
        "APP__API_BASE_URL" => Some("http://app-env:8080".to_string()),
        "APP__PAGE_SIZE" => Some("20".to_string()),
        _ => None,
    });
    assert_eq!(settings.api_base_url, "http://app-env:8080");
    assert_eq!(settings.page_size, 20);
}

#[test]
fn invalid_values_are_ignored() {
    let raw = "page_size = 0\nthis is not toml";
    let settings = load_settings_from(Some(raw), |name| {
        (name == "APP__PAGE_SIZE").then(|| "lots".to_string())
    });
    assert_eq!(settings.page_size, 10);

    let settings = load_settings_from(Some("page_size = -3"), no_env);
    assert_eq!(settings.page_size, 10);
}

#[test]
fn explicit_settings_file_is_read_and_missing_one_falls_back() {
    let dir = std::env::temp_dir().join(format!("rx-desk-config-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let file = dir.join("custom.toml");
    fs::write(&file, "page_size = 30\n").expect("write settings");

    let raw = read_settings_file(Some(&file)).expect("explicit file");
    assert_eq!(load_settings_from(Some(&raw), no_env).page_size, 30);

    let missing = dir.join("absent.toml");
    assert_eq!(read_settings_file(Some(&missing)), None);

    fs::remove_dir_all(&dir).expect("cleanup");
}
