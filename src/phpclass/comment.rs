pub const DEFAULT_COMMENT_WIDTH: usize = 70;

/// Splits `line` into lines of at most `width` characters.
///
/// Lines are broken at the last space that fits, and the space itself is
/// dropped. A word longer than `width` is split where it overflows.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut rest = line;
    // `limit` is the byte offset of the first character past the width.
    while let Some((limit, next)) = rest.char_indices().nth(width) {
        match rest[..limit + next.len_utf8()].rfind(' ') {
            Some(space) if space > 0 => {
                lines.push(rest[..space].to_string());
                rest = &rest[space + 1..];
            }
            _ => {
                lines.push(rest[..limit].to_string());
                rest = &rest[limit..];
            }
        }
    }
    lines.push(rest.to_string());
    lines
}

/// Doc block placed above every generated method.
#[derive(Debug, Clone)]
pub struct MethodComment {
    pub description: String,
    pub detailed_description: String,
    /// `(type, description)` pairs.
    pub params: Vec<(String, String)>,
    pub return_type: String,
}

impl MethodComment {
    pub fn new(description: String, detailed_description: String, return_type: &str) -> Self {
        Self {
            description,
            detailed_description,
            params: Vec::new(),
            return_type: return_type.to_string(),
        }
    }

    pub fn with_param(mut self, param_type: &str, description: &str) -> Self {
        self.params
            .push((param_type.to_string(), description.to_string()));
        self
    }

    pub fn render(&self, width: usize) -> String {
        let mut out = String::from("\t/**\n");
        for line in wrap_line(&self.description, width) {
            out.push_str(&format!("\t * {}\n", line));
        }
        out.push_str("\t *\n");
        for (param_type, description) in &self.params {
            out.push_str(&format!("\t * @param {} {}\n", param_type, description));
        }
        for line in wrap_line(&self.detailed_description, width) {
            out.push_str(&format!("\t * {}\n", line));
        }
        out.push_str(&format!("\t * @return {}\n", self.return_type));
        out.push_str("\t */\n");
        out
    }
}

pub fn class_comment(lowercase_name: &str, width: usize) -> String {
    let description = format!(
        "Class used to handle CRUD operations related to {}s.",
        lowercase_name
    );
    let mut out = String::from("\t/**\n");
    for line in wrap_line(&description, width) {
        out.push_str(&format!("\t * {}\n", line));
    }
    out.push_str("\t */\n");
    out
}
