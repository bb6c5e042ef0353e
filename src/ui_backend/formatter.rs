//! Message formatter: splits a reply into prose and fenced code segments
//!
//! A fenced block is an opening fence (three backticks plus an optional
//! single-token language tag), a newline, a body, and a closing fence. The
//! scanner walks the text with three states and never backtracks past a
//! committed block, so an unterminated fence stays plain text.

use super::types::MessageSegment;

const FENCE: &str = "```";

/// Language reported for blocks without a tag
pub const DEFAULT_LANGUAGE: &str = "code";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    FenceHeader { fence_start: usize },
    BlockBody { fence_start: usize, tag_end: usize, body_start: usize },
}

/// Identifier of the `ordinal`-th code block in message `message_index`
pub fn block_id(message_index: usize, ordinal: usize) -> String {
    format!("code-{}-{}", message_index, ordinal)
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '+' | '#' | '.')
}

/// Split `text` into ordered segments.
pub fn format_message(text: &str, message_index: usize) -> Vec<MessageSegment> {
    let mut segments = Vec::new();
    let mut emitted_to = 0usize;
    let mut ordinal = 0usize;
    let mut cursor = 0usize;
    let mut state = ScanState::Outside;

    loop {
        match state {
            ScanState::Outside => match text[cursor..].find(FENCE) {
                Some(rel) => {
                    state = ScanState::FenceHeader {
                        fence_start: cursor + rel,
                    };
                }
                None => break,
            },
            ScanState::FenceHeader { fence_start } => {
                let header_start = fence_start + FENCE.len();
                let header = &text[header_start..];
                let tag_len: usize = header
                    .chars()
                    .take_while(|c| is_tag_char(*c))
                    .map(char::len_utf8)
                    .sum();
                let tag_end = header_start + tag_len;

                if text[tag_end..].starts_with('\n') {
                    state = ScanState::BlockBody {
                        fence_start,
                        tag_end,
                        body_start: tag_end + 1,
                    };
                } else {
                    // Not an opener here; retry one byte further so runs of
                    // four or more backticks can still open a block.
                    cursor = fence_start + 1;
                    state = ScanState::Outside;
                }
            }
            ScanState::BlockBody {
                fence_start,
                tag_end,
                body_start,
            } => match text[body_start..].find(FENCE) {
                Some(rel) => {
                    let body_end = body_start + rel;
                    if fence_start > emitted_to {
                        segments.push(MessageSegment::text(&text[emitted_to..fence_start]));
                    }

                    let tag = &text[fence_start + FENCE.len()..tag_end];
                    segments.push(MessageSegment::Code {
                        language: if tag.is_empty() {
                            DEFAULT_LANGUAGE.to_string()
                        } else {
                            tag.to_string()
                        },
                        code: text[body_start..body_end].trim().to_string(),
                        block_id: block_id(message_index, ordinal),
                    });
                    ordinal += 1;

                    cursor = body_end + FENCE.len();
                    emitted_to = cursor;
                    state = ScanState::Outside;
                }
                None => {
                    // Unterminated: no later fence can close anything either
                    break;
                }
            },
        }
    }

    if ordinal == 0 {
        return vec![MessageSegment::text(text)];
    }
    if emitted_to < text.len() {
        segments.push(MessageSegment::text(&text[emitted_to..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn code(language: &str, body: &str, id: &str) -> MessageSegment {
        MessageSegment::Code {
            language: language.to_string(),
            code: body.to_string(),
            block_id: id.to_string(),
        }
    }

    #[test]
    fn test_single_block_between_prose() {
        let segments = format_message("pre```js\nconsole.log(1)```post", 0);
        assert_eq!(
            segments,
            vec![
                MessageSegment::text("pre"),
                code("js", "console.log(1)", "code-0-0"),
                MessageSegment::text("post"),
            ]
        );
    }

    #[test]
    fn test_untagged_block_defaults_language() {
        let segments = format_message("```\n| Branch | Sales |\n```", 4);
        assert_eq!(segments, vec![code("code", "| Branch | Sales |", "code-4-0")]);
    }

    #[test]
    fn test_block_ids_count_per_message() {
        let text = "Totals:\n```sql\nSELECT 1\n```\nand\n```text\n  42  \n```";
        let segments = format_message(text, 7);
        let ids: Vec<_> = segments.iter().filter_map(|s| s.block_id()).collect();
        assert_eq!(ids, vec!["code-7-0", "code-7-1"]);
        assert_eq!(segments[0], MessageSegment::text("Totals:\n"));
        assert_eq!(segments[2], MessageSegment::text("\nand\n"));
        assert_eq!(segments[3], code("text", "42", "code-7-1"));
        assert_eq!(segments.len(), 4);
    }

    #[test]
    fn test_unterminated_fence_is_plain_text() {
        let text = "Result:\n```json\n{\"a\": 1}";
        assert_eq!(format_message(text, 0), vec![MessageSegment::text(text)]);
    }

    #[test]
    fn test_fence_without_newline_is_plain_text() {
        let text = "inline ```code``` here";
        assert_eq!(format_message(text, 0), vec![MessageSegment::text(text)]);
    }

    #[test]
    fn test_trailing_text_after_unterminated_second_fence() {
        let text = "```\na\n``` then ```\nb";
        let segments = format_message(text, 1);
        assert_eq!(
            segments,
            vec![
                code("code", "a", "code-1-0"),
                MessageSegment::text(" then ```\nb"),
            ]
        );
    }

    #[test]
    fn test_empty_text_is_single_segment() {
        assert_eq!(format_message("", 0), vec![MessageSegment::text("")]);
    }

    proptest! {
        #[test]
        fn prop_text_without_fences_is_verbatim(text in "[^`]{0,200}") {
            let segments = format_message(&text, 3);
            prop_assert_eq!(segments, vec![MessageSegment::text(text.clone())]);
        }
    }
}
