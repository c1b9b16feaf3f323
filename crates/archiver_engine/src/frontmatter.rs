/// Fixed identifier written into every front-matter block.
pub const PARSER_LABEL: &str = "FULL Content Parser";
/// Fixed mode label: "extract everything", kept verbatim from the operator
/// workflow this tool archives for.
pub const MODE_LABEL: &str = "Извлечение ВСЕГО контента";
/// Render format for `parsed_at`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Build the YAML-like front-matter block plus the level-1 title heading
/// that opens the structured artifact.
pub fn build_metadata_block(url: &str, title: &str, parsed_at: &str) -> String {
    format!(
        "---\nurl: {url}\ntitle: {title}\nparsed_at: {parsed_at}\nparser: {parser}\nmode: {mode}\n---\n\n# {title}\n\n",
        url = url,
        title = title,
        parsed_at = parsed_at,
        parser = PARSER_LABEL,
        mode = MODE_LABEL,
    )
}
