use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_marquee"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "marquee init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".marquee.toml");
    assert!(config_path.exists(), ".marquee.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[llm]"));
    assert!(content.contains("[suggest]"));

    // Everything is commented out, so defaults apply
    let config: marquee_core::MarqueeConfig = toml::from_str(&content).unwrap();
    assert!(config.suggest.enabled);
    assert_eq!(config.llm.model, "gpt-4o-mini");
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".marquee.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_marquee"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".marquee.toml")).unwrap();
    assert_eq!(content, "# existing");
}
