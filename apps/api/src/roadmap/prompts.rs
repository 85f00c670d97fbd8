// LLM prompt templates for the roadmap pipeline.
// Reuses the shared JSON fragment from llm_client::prompts.

/// Skill list prompt. Replace `{topic}` and `{json_instruction}` before sending.
pub const SKILLS_PROMPT_TEMPLATE: &str = "Generate a concise list of essential skills needed to learn {topic}. \
    Format the response as a JSON array of objects with 'name' and 'description' fields. \
    Keep it focused and practical. {json_instruction}";

/// Resource list prompt. Replace `{skill_name}` and `{json_instruction}` before sending.
pub const RESOURCES_PROMPT_TEMPLATE: &str = "Suggest 3 high-quality learning resources for {skill_name}. \
    Include only legitimate, well-known platforms. \
    Format the response as a JSON array of objects with 'title', 'url', and 'type' fields. \
    {json_instruction}";
