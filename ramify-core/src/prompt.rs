//! Prompt construction for mind-map generation.

/// Build the instruction prompt for a topic.
///
/// Deterministic template embedding `topic` verbatim. It asks the model for
/// 5-7 top-level aspects with 3-5 sub-items each, in a comma-terminated
/// markdown outline (`#`/`##` lines) and nothing else. The model's adherence
/// is not validated; its output passes through to the caller unchanged.
pub fn build_mindmap_prompt(topic: &str) -> String {
    format!(
        r#"为主题"{topic}"创建一个详细的思维导图结构。
请生成5-7个主要方面或类别，每个都应该与主题密切相关。
为每个主要方面生成3-5个详细的子主题。
必须返回Markdown格式，使用以下结构:
#主题1,
##子主题1,
##子主题2,
#主题2,
##子主题1,
##子主题2,
...
只返回Markdown数据，不要有任何其他文本。"#
    )
}
