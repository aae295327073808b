//! Human-readable CLI output.
//!
//! The `handle` command prints the JSON response by default; with
//! `--summary` it prints this form instead:
//!
//! ```text
//! original/photo.jpg
//!     optimized/photo.jpg
//!     thumbnails/photo.jpg
//!     sizes/photo-small.jpg
//!     sizes/photo-medium.jpg
//!     sizes/photo-large.jpg
//!     webp/photo.webp
//! thumbnails/old.jpg
//!     skipped: key is outside original/
//!
//! Processed 1 object, skipped 1
//! ```
//!
//! Each `format_*` function returns lines and does no I/O; `print_*`
//! wrappers write them out.

use crate::handler::{ProcessingOutcome, Response, ResponseBody};

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Header line plus indented detail lines for one work item.
pub fn format_outcome(outcome: &ProcessingOutcome) -> Vec<String> {
    let mut lines = vec![outcome.key.clone()];
    if let Some(error) = &outcome.error {
        lines.push(format!("{}failed: {}", indent(1), error));
    } else if let Some(reason) = &outcome.skipped {
        lines.push(format!("{}skipped: {}", indent(1), reason));
    } else {
        lines.extend(
            outcome
                .variants_written
                .iter()
                .map(|key| format!("{}{}", indent(1), key)),
        );
    }
    lines
}

pub fn format_response(response: &Response) -> Vec<String> {
    match &response.body {
        ResponseBody::Error { error, received } => {
            vec![format!("{} (received: {})", error, received.join(", "))]
        }
        ResponseBody::Message { message, results } if results.is_empty() => {
            vec![message.clone()]
        }
        ResponseBody::Message { results, .. } => {
            let mut lines: Vec<String> = results.iter().flat_map(format_outcome).collect();
            let skipped = results.iter().filter(|o| o.skipped.is_some()).count();
            let processed = results.len() - skipped;
            lines.push(String::new());
            let mut summary = format!("Processed {}", plural(processed, "object"));
            if skipped > 0 {
                summary.push_str(&format!(", skipped {skipped}"));
            }
            lines.push(summary);
            lines
        }
    }
}

pub fn print_response(response: &Response) {
    for line in format_response(response) {
        println!("{line}");
    }
}

/// Failures go to stderr so stdout stays empty for a failed invocation.
pub fn print_failure(outcome: &ProcessingOutcome) {
    for line in format_outcome(outcome) {
        eprintln!("{line}");
    }
}
