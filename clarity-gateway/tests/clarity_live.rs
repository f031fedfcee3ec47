//! Live analysis tests against real vendors (requires --features live-tests).
//!
//! Run with: cargo test --features live-tests --test clarity_live
//!
//! Model output varies between runs, so snapshots redact every generated
//! field and only pin the response shape.

#[cfg(feature = "live-tests")]
use clarity_core::{Config, ProviderType};
#[cfg(feature = "live-tests")]
use clarity_gateway::agent::{Agent, ClarityAgent};
#[cfg(feature = "live-tests")]
use clarity_gateway::providers::create_provider;
#[cfg(feature = "live-tests")]
use insta::assert_json_snapshot;

#[cfg(feature = "live-tests")]
fn load_agent(provider: ProviderType) -> Option<ClarityAgent> {
    clarity_core::load_dotenv();

    let config = Config::load().expect("Failed to load config for live tests");
    if !config.has_provider(provider) {
        eprintln!(
            "{} not set; skipping {} live test.",
            provider.api_key_env(),
            provider
        );
        return None;
    }

    let client = create_provider(&config, provider).expect("provider should build");
    Some(ClarityAgent::new(client, &config.settings.agent))
}

#[cfg(feature = "live-tests")]
async fn analyze_remote_work(provider: ProviderType) {
    let Some(agent) = load_agent(provider) else {
        return;
    };

    let response = agent.process("Remote work").await;
    assert!(response.success, "analysis failed: {}", response.message);

    let pros = response.data["analysis"]["pros"].as_array().unwrap();
    let cons = response.data["analysis"]["cons"].as_array().unwrap();
    assert!(pros.len() >= 3 && pros.len() <= 8, "got {} pros", pros.len());
    assert!(cons.len() >= 3 && cons.len() <= 8, "got {} cons", cons.len());

    assert_json_snapshot!(
        format!("remote_work_{}", provider),
        response,
        {
            ".data.topic" => "[topic]",
            ".data.summary" => "[summary]",
            ".data.analysis.pros" => "[pros]",
            ".data.analysis.cons" => "[cons]",
            ".metadata.model_used" => "[model]",
            ".metadata.tokens_used" => "[tokens]"
        }
    );
}

#[cfg(feature = "live-tests")]
#[tokio::test]
async fn test_openai_remote_work() {
    analyze_remote_work(ProviderType::OpenAi).await;
}

#[cfg(feature = "live-tests")]
#[tokio::test]
async fn test_anthropic_remote_work() {
    analyze_remote_work(ProviderType::Anthropic).await;
}
