use crate::tool_spec::ToolSpec;

/// Registry of known tool identifiers across both vendors
const TOOL_NAMES: &[ToolSpec] = &[
    // Claude Code tools
    ToolSpec::new("Bash", "bash"),
    ToolSpec::new("Read", "read"),
    ToolSpec::new("Write", "write"),
    ToolSpec::new("Edit", "edit"),
    ToolSpec::new("Glob", "glob"),
    ToolSpec::new("Grep", "grep"),
    ToolSpec::new("WebSearch", "web_search"),
    ToolSpec::new("WebFetch", "web_fetch"),
    // Codex item types
    ToolSpec::new("command_execution", "bash"),
    ToolSpec::new("file_change", "file_change"),
    ToolSpec::new("mcp_tool_call", "mcp"),
    ToolSpec::new("web_search", "web_search"),
    ToolSpec::new("todo_list", "todo_list"),
];

/// Map a vendor tool identifier to its canonical name.
///
/// Exact match against the registry; anything else is lowercased verbatim.
pub fn canonical_tool_name(name: &str) -> String {
    TOOL_NAMES
        .iter()
        .find(|spec| spec.vendor_name == name)
        .map(|spec| spec.canonical.to_string())
        .unwrap_or_else(|| name.to_lowercase())
}
