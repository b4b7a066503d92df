use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

use super::StackFrame;

const LINES_BEFORE: usize = 5;
const LINES_AFTER: usize = 5;
const TAB_WIDTH: usize = 8;

type SourceCache = HashMap<PathBuf, Option<Arc<[String]>>, FxBuildHasher>;

static SOURCE_CACHE: spin::Mutex<SourceCache> = spin::Mutex::new(HashMap::with_hasher(FxBuildHasher));

fn read_lines(path: &Path) -> Option<Arc<[String]>> {
    if let Some(cached) = SOURCE_CACHE.lock().get(path) {
        return cached.clone();
    }

    let lines: Option<Arc<[String]>> = std::fs::read_to_string(path)
        .ok()
        .map(|contents| contents.lines().map(str::to_owned).collect());
    SOURCE_CACHE
        .lock()
        .insert(path.to_path_buf(), lines.clone());
    lines
}

/// Numbered source lines around the frame's line, with the failing line
/// underlined. Empty when the source file cannot be read.
pub(crate) fn source_context(frame: &StackFrame) -> Vec<String> {
    let Some(path) = frame.source_path() else {
        return Vec::new();
    };
    let Some(lines) = read_lines(path) else {
        return Vec::new();
    };
    let Some(current) = (frame.line as usize).checked_sub(1) else {
        return Vec::new();
    };
    if current >= lines.len() {
        return Vec::new();
    }

    let start = current.saturating_sub(LINES_BEFORE);
    let end = (current + LINES_AFTER).min(lines.len() - 1);

    let mut output = Vec::with_capacity(end - start + 2);
    for (index, line) in lines.iter().enumerate().take(end + 1).skip(start) {
        output.push(format!("{}\t{}", index + 1, line));
        if index == current {
            let code = line.trim_start_matches([' ', '\t']);
            let indent = &line[..line.len() - code.len()];
            let tabs = indent.chars().filter(|&c| c == '\t').count();
            let offset = indent.len() + (TAB_WIDTH - 1) * tabs;
            output.push(format!(
                "\t{}{}",
                " ".repeat(offset),
                "^".repeat(code.chars().count())
            ));
        }
    }
    output
}
