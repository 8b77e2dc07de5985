use super::*;

#[test]
fn provider_defaults_to_anthropic() {
    assert_eq!(parse_provider(None).unwrap(), LlmProviderKind::Anthropic);
}

#[test]
fn provider_parses_known_values() {
    assert_eq!(parse_provider(Some("anthropic")).unwrap(), LlmProviderKind::Anthropic);
    assert_eq!(parse_provider(Some("openai")).unwrap(), LlmProviderKind::OpenAi);
}

#[test]
fn provider_rejects_unknown() {
    let err = parse_provider(Some("bard")).unwrap_err();
    assert!(matches!(err, LlmError::ConfigParse(msg) if msg.contains("bard")));
}

#[test]
fn default_models_per_provider() {
    assert!(default_model(LlmProviderKind::Anthropic).starts_with("claude"));
    assert!(default_model(LlmProviderKind::OpenAi).starts_with("gpt"));
}
