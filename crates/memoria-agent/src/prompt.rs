//! Prompt assembly.

use std::fmt::Write;

/// Build the prompt sent to the generation provider.
///
/// The "Relevant context" block is omitted when there are no memories.
pub fn build_prompt(task: &str, memories: &[String]) -> String {
    let mut prompt = format!("Task: {}\n\n", task);

    if !memories.is_empty() {
        prompt.push_str("Relevant context:\n");
        for memory in memories {
            let _ = writeln!(prompt, "- {}", memory);
        }
    }

    prompt.push_str("\nPlease process this task considering the above context.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_without_memories() {
        let prompt = build_prompt("What color is the sky?", &[]);
        assert_eq!(
            prompt,
            "Task: What color is the sky?\n\n\nPlease process this task considering the above context."
        );
        assert!(!prompt.contains("Relevant context"));
    }

    #[test]
    fn test_prompt_with_memories() {
        let memories = vec!["The sky is blue".to_string(), "Grass is green".to_string()];
        let prompt = build_prompt("Describe nature", &memories);
        assert_eq!(
            prompt,
            "Task: Describe nature\n\n\
             Relevant context:\n\
             - The sky is blue\n\
             - Grass is green\n\
             \nPlease process this task considering the above context."
        );
    }
}
