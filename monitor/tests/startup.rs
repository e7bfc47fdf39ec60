use std::collections::HashMap;

use monitor::AppConfig;
use monitor::startup::{EXIT_STARTUP_FAILURE, exit_status, load_env_file, run};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |var| map.get(var).cloned()
}

#[test]
fn missing_explicit_env_file_is_a_startup_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.env");

    assert!(load_env_file(Some(&path)).is_err());
    Ok(())
}

#[test]
fn run_outcomes_map_to_exit_status() {
    assert_eq!(exit_status(&Ok(0)), 0);
    assert_eq!(exit_status(&Ok(2)), 2);
    assert_eq!(
        exit_status(&Err(anyhow::anyhow!("state dir unwritable"))),
        EXIT_STARTUP_FAILURE
    );
    assert_eq!(EXIT_STARTUP_FAILURE, 1);
}

#[tokio::test]
async fn invalid_configuration_exits_with_one() {
    let config = AppConfig::from_lookup(lookup(&[
        ("SPREAD_THRESHOLD", "NaN"),
        ("SPREAD_HYSTERESIS", "nan"),
    ]));

    let outcome = run(config).await;

    assert_eq!(exit_status(&outcome), 1);
    let message = format!("{:#}", outcome.unwrap_err());
    assert!(message.contains("invalid configuration"));
    assert!(message.contains("SPREAD_THRESHOLD"));
}

#[tokio::test]
async fn bad_source_spec_exits_with_one() {
    let config = AppConfig::from_lookup(lookup(&[("TRADED_SOURCES", "nowhere:usdttwd")]));

    assert_eq!(exit_status(&run(config).await), EXIT_STARTUP_FAILURE);
}
