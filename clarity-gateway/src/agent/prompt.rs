//! Prompt construction for the clarity agent.
//!
//! content: prompts/clarity-system.md

const SYSTEM_TEMPLATE: &str = include_str!("../../prompts/clarity-system.md");

/// Fewest points requested per side.
pub const MIN_POINTS: usize = 3;

/// Most points requested per side, regardless of configuration.
pub const MAX_POINTS: usize = 8;

/// System prompt asking for a JSON pros/cons analysis.
///
/// `max_pros_cons` caps the number of points requested per side.
pub fn system_prompt(max_pros_cons: usize) -> String {
    let max_points = max_pros_cons.clamp(MIN_POINTS, MAX_POINTS);
    SYSTEM_TEMPLATE
        .trim_end()
        .replace("{{max_points}}", &max_points.to_string())
}

/// User prompt for a topic.
pub fn user_prompt(topic: &str) -> String {
    format!("Analyze the following topic: {}", topic)
}
