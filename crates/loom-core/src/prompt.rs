//! Prompt construction for planning and content calls

use crate::parser::{BEGIN_MARKER, END_MARKER};
use crate::provider::ChatMessage;
use loom_types::{ChatTurn, CloudConfig, DesignConfig, Operation, Project, Role};
use once_cell::sync::Lazy;
use regex::Regex;

/// Prior turns replayed into the planning call
pub const HISTORY_WINDOW: usize = 10;

pub const PLANNING_TEMPERATURE: f32 = 0.45;
pub const PLANNING_MAX_TOKENS: u32 = 4000;
pub const CONTENT_TEMPERATURE: f32 = 0.2;
pub const CONTENT_MAX_TOKENS: u32 = 16000;

/// System prompt for the planning model
pub static PLANNING_SYSTEM_PROMPT: Lazy<String> = Lazy::new(|| {
    format!(
        "You are Loom, a senior web developer that plans and orchestrates changes to a small web project.

When the user asks you to build or change something, reply with:
1. A short explanation of the change (one to three sentences)
2. One file operation block per file, in exactly this format:

{begin}
TYPE: CREATE | MODIFY | DELETE
PATH: relative/path/to/file.ext
DESCRIPTION: What the file does, or what to change in it
{end}

Rules:
- Prefer TypeScript (.ts) unless the user asks for something else
- A new project needs at least index.html, styles.css and a script file
- Paths are relative, with no leading slash
- Make descriptions specific enough for another model to write the file from them alone
- For MODIFY describe what changes, never the full code
- DELETE needs no description
- Order operations so that files another file depends on come first

If the user is just talking, answer normally and emit no operation blocks.",
        begin = BEGIN_MARKER,
        end = END_MARKER
    )
});

/// System prompt for the content model
pub const CONTENT_SYSTEM_PROMPT: &str = "You are a code generation engine. You are given a file path and a description of what to create or change, and you reply with the complete file contents only.

Rules:
- Output only the file contents, no explanations or commentary
- Prefer TypeScript unless told otherwise
- Use semantic HTML, modern CSS (custom properties, flexbox, grid) and ES2022+ scripts
- HTML files need a DOCTYPE, a viewport meta tag, and link/script tags for the project's stylesheet and script
- Keep accessibility-friendly defaults and responsive layouts
- Preserve existing behaviour unless the description changes it
- When modifying a file, output the complete modified file";

static LEADING_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[\w+.#-]*[^\n]*\n?").expect("fence regex is valid"));

static TRAILING_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n?```\s*$").expect("fence regex is valid"));

/// Per-round inputs that shape both prompts
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptContext<'a> {
    pub plan_mode: bool,
    pub extended_thinking: bool,
    pub selected_model: Option<&'a str>,
    pub design: Option<&'a DesignConfig>,
    pub cloud: Option<&'a CloudConfig>,
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

/// Design requirements block, empty without a design config
pub fn design_context(design: Option<&DesignConfig>) -> String {
    let Some(d) = design else {
        return String::new();
    };
    [
        "Design requirements from user settings:".to_string(),
        format!("- Component library: {}", d.component_library.as_str()),
        format!("- Main color: {}", d.main_color),
        format!("- Accent color: {}", d.accent_color),
        format!("- Button theme: {}", d.button_theme.as_str()),
        format!("- Compact spacing: {}", on_off(d.compact_spacing)),
        format!("- High contrast: {}", on_off(d.high_contrast)),
        format!("- Animations: {}", on_off(d.enable_animations)),
        format!("- Strong shadows: {}", on_off(d.strong_shadows)),
    ]
    .join("\n")
}

/// Provider and backend block, empty without a cloud config
pub fn cloud_context(cloud: Option<&CloudConfig>) -> String {
    let Some(c) = cloud else {
        return String::new();
    };
    let mut lines = vec![format!("Cloud provider preference: {}", c.provider)];

    if let Some(model) = c.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        lines.push(format!("Preferred model override: {}", model));
    }

    let url = c.supabase_url.as_deref().map(str::trim).unwrap_or_default();
    let key = c.supabase_anon_key.as_deref().map(str::trim).unwrap_or_default();
    if !url.is_empty() && !key.is_empty() {
        lines.push("Supabase is connected for this project.".to_string());
        lines.push(format!("Supabase URL: {}", url));
        lines.push("Read keys from environment variables; never hardcode secrets in source files.".to_string());
    } else {
        lines.push("Supabase is not configured.".to_string());
    }

    lines.join("\n")
}

/// Design and cloud context joined for content calls
pub fn generation_context(ctx: &PromptContext<'_>) -> String {
    [design_context(ctx.design), cloud_context(ctx.cloud)]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Messages for the planning call
///
/// `history` holds the turns before this instruction; only the last
/// [`HISTORY_WINDOW`] are replayed.
pub fn planning_messages(
    ctx: &PromptContext<'_>,
    project: &Project,
    history: &[ChatTurn],
    instruction: &str,
) -> Vec<ChatMessage> {
    let mut system = PLANNING_SYSTEM_PROMPT.clone();

    if project.files.is_empty() {
        system.push_str("\n\nCurrent project files: none");
    } else {
        system.push_str("\n\nCurrent project files:");
        for file in &project.files {
            system.push_str(&format!("\n- {} ({})", file.path, file.language));
        }
    }

    if ctx.plan_mode {
        system.push_str("\n\nExecution mode: PLAN ON. Give a concise plan followed by the operation blocks.");
    } else {
        system.push_str("\n\nExecution mode: PLAN OFF. Act immediately. Emit the operation blocks with a single short status line.");
    }

    if ctx.extended_thinking {
        system.push_str("\n\nExtended thinking is ON. Weigh robustness, architecture and edge cases before choosing operations.");
    }

    if let Some(model) = ctx.selected_model {
        system.push_str(&format!("\n\nSelected reasoning model preference: {}", model));
    }

    for block in [design_context(ctx.design), cloud_context(ctx.cloud)] {
        if !block.is_empty() {
            system.push_str("\n\n");
            system.push_str(&block);
        }
    }

    let skip = history.len().saturating_sub(HISTORY_WINDOW);
    let mut messages = Vec::with_capacity(HISTORY_WINDOW + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history[skip..].iter().map(|turn| match turn.role {
        Role::User => ChatMessage::user(turn.content.clone()),
        Role::Assistant => ChatMessage::assistant(turn.content.clone()),
    }));
    messages.push(ChatMessage::user(instruction));
    messages
}

/// Messages for one content call
///
/// `existing` is the content the file has at this point in the round, which
/// may come from an earlier operation of the same round.
pub fn content_messages(
    ctx: &PromptContext<'_>,
    op: &Operation,
    existing: Option<&str>,
) -> Vec<ChatMessage> {
    let description = if op.description.is_empty() {
        "Implement based on request context."
    } else {
        op.description.as_str()
    };

    let mut body = vec![
        format!("Generate the complete contents for: {}", op.path),
        String::new(),
        format!("Description: {}", description),
    ];

    let context = generation_context(ctx);
    if !context.is_empty() {
        body.push(String::new());
        body.push(context);
    }

    if let Some(existing) = existing.filter(|c| !c.is_empty()) {
        body.extend([
            String::new(),
            "Existing file contents:".to_string(),
            "```".to_string(),
            existing.to_string(),
            "```".to_string(),
            String::new(),
            "Modify the above file according to the description. Output the COMPLETE modified file."
                .to_string(),
        ]);
    }

    vec![
        ChatMessage::system(CONTENT_SYSTEM_PROMPT),
        ChatMessage::user(body.join("\n")),
    ]
}

/// Strip one surrounding code fence from a content reply
pub fn extract_file_content(reply: &str) -> String {
    let trimmed = reply.trim();
    let without_lead = LEADING_FENCE_RE.replace(trimmed, "");
    let without_trail = TRAILING_FENCE_RE.replace(&without_lead, "");
    without_trail.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MessageRole;
    use loom_types::{File, OperationKind, ProviderKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_file_content() {
        assert_eq!(extract_file_content("```ts\nconst a = 1;\n```"), "const a = 1;");
        assert_eq!(extract_file_content("```\nbody {}\n```\n"), "body {}");
        assert_eq!(extract_file_content("  plain text  "), "plain text");
        assert_eq!(
            extract_file_content("```html\n<p>```inline```</p>\n```"),
            "<p>```inline```</p>"
        );
    }

    #[test]
    fn test_planning_messages_layout() {
        let project = Project {
            files: vec![File::new("index.html", "<p>secret body</p>"), File::new("app.ts", "")],
            ..Project::default()
        };
        let history: Vec<ChatTurn> = (0..14).map(|i| ChatTurn::user(format!("turn {}", i))).collect();
        let ctx = PromptContext {
            plan_mode: true,
            ..PromptContext::default()
        };

        let messages = planning_messages(&ctx, &project, &history, "add a footer");
        assert_eq!(messages.len(), HISTORY_WINDOW + 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert!(messages[0].content.contains("- index.html (html)"));
        assert!(messages[0].content.contains("- app.ts (typescript)"));
        assert!(!messages[0].content.contains("secret body"));
        assert!(messages[0].content.contains("PLAN ON"));
        assert_eq!(messages[1].content, "turn 4");
        assert_eq!(messages.last().map(|m| m.content.as_str()), Some("add a footer"));
    }

    #[test]
    fn test_planning_context_blocks() {
        let design = DesignConfig::default();
        let cloud = CloudConfig {
            provider: ProviderKind::Claude,
            supabase_url: Some("https://x.supabase.co".to_string()),
            supabase_anon_key: Some("anon".to_string()),
            ..CloudConfig::default()
        };
        let ctx = PromptContext {
            plan_mode: false,
            extended_thinking: true,
            selected_model: Some("grok-4"),
            design: Some(&design),
            cloud: Some(&cloud),
        };

        let messages = planning_messages(&ctx, &Project::default(), &[], "hi");
        let system = &messages[0].content;
        assert!(system.contains("Current project files: none"));
        assert!(system.contains("PLAN OFF"));
        assert!(system.contains("Extended thinking is ON"));
        assert!(system.contains("Selected reasoning model preference: grok-4"));
        assert!(system.contains("- Animations: enabled"));
        assert!(system.contains("Cloud provider preference: claude"));
        assert!(system.contains("Supabase URL: https://x.supabase.co"));
    }

    #[test]
    fn test_content_messages_include_existing_content() {
        let op = Operation::new(OperationKind::Modify, "a.js", "Add reset");

        let messages = content_messages(&PromptContext::default(), &op, Some("let n = 0;"));
        assert_eq!(messages.len(), 2);
        let user = &messages[1].content;
        assert!(user.starts_with("Generate the complete contents for: a.js"));
        assert!(user.contains("Description: Add reset"));
        assert!(user.contains("Existing file contents:\n```\nlet n = 0;\n```"));

        let fresh = content_messages(&PromptContext::default(), &Operation::create("b.css", ""), Some(""));
        assert!(!fresh[1].content.contains("Existing file contents"));
        assert!(fresh[1].content.contains("Implement based on request context."));
    }

    #[test]
    fn test_cloud_context_without_backend() {
        let cloud = CloudConfig {
            model: Some("  ".to_string()),
            ..CloudConfig::default()
        };
        let text = cloud_context(Some(&cloud));
        assert!(!text.contains("Preferred model override"));
        assert!(text.contains("Supabase is not configured."));
        assert!(cloud_context(None).is_empty());
    }
}
