use super::*;

#[tokio::test]
async fn test_mock_engine_replays_script_in_order() {
    let engine = MockEngine::scripted(["first", "second"]);
    let prompt = Prompt::new("system", "user");

    assert_eq!(engine.invoke(&prompt).await.unwrap(), "first");
    assert_eq!(engine.invoke(&prompt).await.unwrap(), "second");
    assert!(matches!(
        engine.invoke(&prompt).await,
        Err(EngineError::Unavailable(_))
    ));
    assert_eq!(engine.calls(), 3);
    assert_eq!(engine.prompts().len(), 3);
}

#[tokio::test]
async fn test_mock_engine_script_takes_priority_over_responder() {
    let engine = MockEngine::from_fn(|prompt| Ok(format!("echo: {}", prompt.user)));
    engine.push_err(EngineError::Transport("connection reset".to_string()));

    let prompt = Prompt::new("s", "hello");
    assert!(matches!(
        engine.invoke(&prompt).await,
        Err(EngineError::Transport(_))
    ));
    assert_eq!(engine.invoke(&prompt).await.unwrap(), "echo: hello");
}

#[test]
fn test_prompt_contains_checks_both_messages() {
    let prompt = Prompt::new("You are an analyst", "City: Nairobi");
    assert!(prompt.contains("analyst"));
    assert!(prompt.contains("Nairobi"));
    assert!(!prompt.contains("Lagos"));
}

#[test]
fn test_engine_settings_defaults() {
    let settings = EngineSettings::default();
    assert_eq!(settings.temperature, 0.1);
    assert_eq!(settings.max_tokens, 2000);
    assert_eq!(settings.timeout, std::time::Duration::from_secs(300));

    let engine = GenaiEngine::new(EngineSettings {
        model: "llama3.1:8b".to_string(),
        ..Default::default()
    });
    assert_eq!(engine.name(), "llama3.1:8b");
}
