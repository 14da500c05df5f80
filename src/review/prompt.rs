//! 审查提示词组装

use super::fetcher::SourceFile;

const TRUNCATED_MARKER: &str = "\n[... truncated ...]\n";

/// 提示词组装器
///
/// 输出由说明头和按拉取顺序排列的文件段落组成。`max_chars` 为字符预算（0 表示不限），
/// 超出预算的那一段会被截断，之后的文件只保留路径。
#[derive(Debug, Clone, Default)]
pub struct PromptAssembler {
    max_chars: usize,
}

impl PromptAssembler {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn assemble(&self, assignment_title: &str, repo_url: &str, files: &[SourceFile]) -> String {
        let mut prompt = header(assignment_title, repo_url);
        let mut remaining = if self.max_chars == 0 {
            usize::MAX
        } else {
            self.max_chars.saturating_sub(prompt.chars().count())
        };
        let mut truncated = false;
        let mut omitted: Vec<&str> = Vec::new();

        for file in files {
            if truncated {
                omitted.push(&file.path);
                continue;
            }

            let title = format!("--- File: {} ---\n", file.path);
            let title_len = title.chars().count();
            let section_len = title_len + file.content.chars().count() + 2;

            if section_len <= remaining {
                prompt.push_str(&title);
                prompt.push_str(&file.content);
                prompt.push_str("\n\n");
                remaining -= section_len;
            } else if title_len < remaining {
                prompt.push_str(&title);
                prompt.push_str(truncate_chars(&file.content, remaining - title_len));
                prompt.push_str(TRUNCATED_MARKER);
                truncated = true;
            } else {
                omitted.push(&file.path);
                truncated = true;
            }
        }

        if !omitted.is_empty() {
            prompt.push_str("\n[Files omitted due to size limit]\n");
            for path in omitted {
                prompt.push_str("- ");
                prompt.push_str(path);
                prompt.push('\n');
            }
        }

        prompt
    }
}

fn header(assignment_title: &str, repo_url: &str) -> String {
    format!(
        "You are reviewing a student's submission for the assignment \"{assignment_title}\".\n\
         Repository: {repo_url}\n\n\
         Please review the code below and give concise, actionable feedback covering:\n\
         1. Bugs and correctness problems\n\
         2. Code style and readability\n\
         3. Best practices and suggested improvements\n\n"
    )
}

/// 按字符数截断，保证不会切断 UTF-8 字符
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
