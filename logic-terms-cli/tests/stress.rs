use logic_terms_cli::{run_stress, CliError, StressConfig};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn default_run_finds_no_violations() {
    init_logger();
    let report = run_stress(&StressConfig {
        pairs: 300,
        ..StressConfig::default()
    })
    .unwrap();
    assert_eq!(report.pairs, 300);
    assert_eq!(report.violations(), 0, "{report}");
    assert!(report.unified > 0);
    assert!(report.instantiated > 0);
}

#[test]
fn occurs_check_run_finds_no_violations() {
    let report = run_stress(&StressConfig {
        seed: 99,
        pairs: 300,
        occurs_check: true,
        ..StressConfig::default()
    })
    .unwrap();
    assert_eq!(report.violations(), 0, "{report}");
    assert_eq!(report.pairs, 300);
}

#[test]
fn runs_are_reproducible() {
    let config = StressConfig {
        seed: 12345,
        pairs: 100,
        depth: 3,
        vars: 2,
        occurs_check: false,
    };
    assert_eq!(run_stress(&config).unwrap(), run_stress(&config).unwrap());
}

#[test]
fn ground_terms() {
    let report = run_stress(&StressConfig {
        seed: 5,
        pairs: 200,
        vars: 0,
        ..StressConfig::default()
    })
    .unwrap();
    assert_eq!(report.cyclic, 0);
    assert_eq!(report.violations(), 0, "{report}");
}

#[test]
fn violation_error_message() {
    let err = CliError::PropertyViolated { count: 2, pairs: 10 };
    assert_eq!(err.to_string(), "2 property violation(s) in 10 term pairs");
}
