use super::{SearchClient, SearchError};
use crate::llm::{TextGenerator, prompts};
use crate::ui::{Console, Tone};
use scraper::{Html, Node};
use tracing::warn;

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Visible text of an HTML page, one trimmed line per text node, capped at
/// [`prompts::SUMMARY_INPUT_CHARS`] characters
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let text = document
        .tree
        .root()
        .descendants()
        .filter_map(|node| {
            let Node::Text(text) = node.value() else {
                return None;
            };
            let hidden = node.ancestors().any(|parent| {
                parent
                    .value()
                    .as_element()
                    .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
            });
            let line = text.trim();
            (!hidden && !line.is_empty()).then_some(line)
        })
        .collect::<Vec<_>>()
        .join("\n");

    text.chars().take(prompts::SUMMARY_INPUT_CHARS).collect()
}

/// Search, then fetch and summarize every result. Per-result failures are
/// printed and skipped.
pub async fn handle_search(
    console: &mut dyn Console,
    client: &SearchClient,
    generator: &dyn TextGenerator,
    query: &str,
) -> Result<usize, SearchError> {
    console.say(&format!("Scanning the web for: {}", query));

    let results = client.search(query, client.max_results()).await?;
    if results.is_empty() {
        console.show(Tone::Warning, "No search results found.");
        return Ok(0);
    }

    for (idx, result) in results.iter().enumerate() {
        console.show(Tone::Command, &format!("\nResult {}: {}", idx + 1, result.title));
        console.say(&result.url);

        match client.fetch_page_text(&result.url).await {
            Ok(text) if text.is_empty() => {
                console.show(Tone::Warning, "Page has no readable text.");
            }
            Ok(text) => match generator.generate(&prompts::summarize_page(&text)).await {
                Ok(summary) => console.say(&format!("Summary:\n{}", summary.trim())),
                Err(err) => {
                    warn!(error = %err, url = %result.url, "summary failed");
                    console.show(Tone::Error, &format!("Summarization failed: {}", err));
                }
            },
            Err(err) => {
                warn!(error = %err, url = %result.url, "page fetch failed");
                console.show(Tone::Error, &format!("Error extracting: {}", err));
            }
        }

        console.say(&"-".repeat(60));
    }

    Ok(results.len())
}
