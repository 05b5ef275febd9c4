use todolist::config::LoggingConfig;
use todolist::logger::Logger;

#[test]
fn test_config_based_logging_disabled() {
    let config = LoggingConfig::default();
    let logger = Logger::from_config(&config).unwrap();
    assert!(!logger.is_enabled());
    assert!(!logger.has_file_writer());

    logger.log("Test message".to_string());
    let logs = logger.get_logs();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].contains("Test message"));
}

#[test]
fn test_invalid_level_is_rejected() {
    let config = LoggingConfig {
        enabled: true,
        level: "chatty".to_string(),
    };
    assert!(Logger::from_config(&config).is_err());
}

#[test]
fn test_logs_are_newest_first() {
    let logger = Logger::new();
    logger.log("first".to_string());
    logger.log("second".to_string());

    let logs = logger.get_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[0].ends_with("second"));
    assert!(logs[1].ends_with("first"));
    assert!(logs[0].starts_with('['));
}

#[test]
fn test_clones_share_entries_and_clear() {
    let logger = Logger::new();
    let clone = logger.clone();
    clone.log("from clone".to_string());
    assert_eq!(logger.get_logs().len(), 1);

    logger.clear();
    assert!(clone.get_logs().is_empty());
}

#[test]
fn test_buffer_is_bounded() {
    let logger = Logger::new();
    for i in 0..(todolist::constants::LOG_BUFFER_CAPACITY + 10) {
        logger.log(format!("entry {}", i));
    }
    let logs = logger.get_logs();
    assert_eq!(logs.len(), todolist::constants::LOG_BUFFER_CAPACITY);
    assert!(logs[0].ends_with(&format!("entry {}", todolist::constants::LOG_BUFFER_CAPACITY + 9)));
}

#[test]
fn test_log_file_path_location() {
    // No data directory can be resolved without a home directory
    if let Ok(path) = Logger::get_log_file_path() {
        assert!(path.ends_with("todolist/todolist.log"));
    }
}
