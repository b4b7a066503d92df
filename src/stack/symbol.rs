use std::sync::OnceLock;

/// Where a resolved frame comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum FrameOrigin {
    /// The Rust runtime, the test harness or the stack walker.
    Runtime,
    /// faultline itself.
    Library,
    /// Everything else, including faultline's unit tests.
    User,
}

const RUNTIME_CRATES: &[&str] = &[
    "std",
    "core",
    "alloc",
    "test",
    "backtrace",
    "panic_unwind",
    "panic_abort",
];

const LIBC_START_SYMBOLS: &[&str] = &[
    "main",
    "_start",
    "__libc_start_main",
    "__libc_start_main_impl",
    "__libc_start_call_main",
];

const LIBRARY_CRATE: &str = env!("CARGO_CRATE_NAME");
const LIBRARY_SRC: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src/");

fn path_regexes() -> &'static [regex::Regex; 2] {
    static REGEXES: OnceLock<[regex::Regex; 2]> = OnceLock::new();
    REGEXES.get_or_init(|| {
        [
            // Rust sysroot sources:
            // - /lib/rustlib/src/rust/library/{crate}/src/...
            // - /rustc/{40-char-hash}/library/{crate}/src/...
            regex::Regex::new(r"(?:/lib/rustlib/src/rust|^/rustc/[0-9a-f]{40})/library/([a-z_]+)/src/")
                .expect("built-in regex pattern for sysroot paths should be valid"),
            // Cargo registry sources:
            // - /.cargo/registry/src/{index}-{16-char-hash}/{crate}-{version}/src/...
            regex::Regex::new(r"/\.cargo/registry/src/[^/]+-[0-9a-f]{16}/([^./]+)-[0-9]+\.[^/]*/src/")
                .expect("built-in regex pattern for cargo registry paths should be valid"),
        ]
    })
}

/// Returns `true` for sysroot sources and registry sources of runtime crates.
fn is_runtime_path(path: &str) -> bool {
    let normalized;
    let path = if path.contains('\\') {
        normalized = path.replace('\\', "/");
        normalized.as_str()
    } else {
        path
    };
    let [sysroot, registry] = path_regexes();
    sysroot
        .captures(path)
        .or_else(|| registry.captures(path))
        .and_then(|captures| captures.get(1))
        .is_some_and(|name| RUNTIME_CRATES.contains(&name.as_str()))
}

/// Crate name a demangled symbol belongs to: `<alloc::boxed::Box<F>>::new`
/// belongs to `alloc`.
fn symbol_crate(symbol: &str) -> &str {
    let trimmed = symbol.trim_start_matches(['<', '&', '*', ' ']);
    let trimmed = trimmed.strip_prefix("mut ").unwrap_or(trimmed);
    let end = trimmed
        .find(|c: char| c == ':' || c == '<' || c == ' ' || c == '>')
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

pub(super) fn classify(symbol: &str, path: &str) -> FrameOrigin {
    if is_runtime_path(path) {
        return FrameOrigin::Runtime;
    }

    let krate = symbol_crate(symbol);
    if RUNTIME_CRATES.contains(&krate) || LIBC_START_SYMBOLS.contains(&symbol) {
        return FrameOrigin::Runtime;
    }

    let in_library = krate == LIBRARY_CRATE || path.starts_with(LIBRARY_SRC);
    if in_library && !symbol.contains("::tests::") {
        FrameOrigin::Library
    } else {
        FrameOrigin::User
    }
}

/// Splits a demangled path at top-level `::`, ignoring separators nested in
/// `<...>` generics or `{...}` closure markers.
fn split_segments(s: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut angle_nesting_level = 0u64;
    let mut curly_nesting_level = 0u64;
    let mut potential_function_arrow = false;
    let mut segment_start = 0usize;
    let mut chars = s.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let was_potential_function_arrow = potential_function_arrow;
        potential_function_arrow = c == '-';

        match c {
            '<' => angle_nesting_level = angle_nesting_level.saturating_add(1),
            '>' if !was_potential_function_arrow => {
                angle_nesting_level = angle_nesting_level.saturating_sub(1);
            }
            '{' => curly_nesting_level = curly_nesting_level.saturating_add(1),
            '}' => curly_nesting_level = curly_nesting_level.saturating_sub(1),
            ':' if angle_nesting_level == 0
                && curly_nesting_level == 0
                && chars.peek().is_some_and(|&(_, next)| next == ':') =>
            {
                segments.push(&s[segment_start..i]);
                chars.next();
                segment_start = i + 2;
            }
            _ => {}
        }
    }
    segments.push(&s[segment_start..]);
    segments
}

/// Strips generic arguments from a type segment: `Vec<T>` becomes `Vec`.
fn strip_generics(segment: &str) -> &str {
    segment.split('<').next().unwrap_or(segment).trim()
}

/// Reduces `<faultline::builder::ErrorBuilder as Trait>` or
/// `<app::Repo>` to the bare type name.
fn qualified_self_type(segment: &str) -> &str {
    let inner = segment
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(segment);
    let self_type = match find_top_level(inner, " as ") {
        Some(index) => &inner[..index],
        None => inner,
    };
    let self_type = self_type.trim_start_matches(['&', '*']).trim_start();
    let self_type = self_type.strip_prefix("mut ").unwrap_or(self_type);
    split_segments(self_type)
        .last()
        .copied()
        .map(strip_generics)
        .unwrap_or(self_type)
}

fn find_top_level(s: &str, needle: &str) -> Option<usize> {
    let mut depth = 0u64;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth = depth.saturating_add(1),
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 && s[i..].starts_with(needle) => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars
        .next()
        .is_some_and(|c| unicode_ident::is_xid_start(c) || c == '_')
        && chars.all(unicode_ident::is_xid_continue)
}

fn is_type_name(segment: &str) -> bool {
    is_identifier(segment) && segment.chars().next().is_some_and(char::is_uppercase)
}

/// Shortens a demangled symbol to the part useful in an error report.
///
/// - `app::db::query` becomes `query`
/// - `<app::db::Repo>::load::<u32>` becomes `Repo::load`
/// - `<app::Repo as app::Store>::get` becomes `Repo::get`
/// - `app::run::{{closure}}` becomes `run::{{closure}}`
pub(super) fn shorten_function_name(symbol: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for (index, segment) in split_segments(symbol).into_iter().enumerate() {
        if segment.starts_with('<') {
            if index == 0 {
                segments.push(qualified_self_type(segment));
            }
            continue;
        }
        if segment.len() == 17
            && segment.starts_with('h')
            && segment[1..].chars().all(|c| c.is_ascii_hexdigit())
        {
            continue;
        }
        segments.push(strip_generics(segment));
    }

    let Some(last_index) = segments.len().checked_sub(1) else {
        return symbol.to_owned();
    };

    let mut start = last_index;
    while start > 0 && segments[start].starts_with('{') {
        start -= 1;
    }
    if start > 0 && is_identifier(segments[start]) && is_type_name(segments[start - 1]) {
        start -= 1;
    }

    segments[start..].join("::")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_plain_function() {
        assert_eq!(shorten_function_name("app::db::query"), "query");
        assert_eq!(shorten_function_name("main"), "main");
    }

    #[test]
    fn test_shorten_method() {
        assert_eq!(shorten_function_name("<app::db::Repo>::load"), "Repo::load");
        assert_eq!(shorten_function_name("app::db::Repo::load"), "Repo::load");
        assert_eq!(
            shorten_function_name("<app::Repo<u8> as app::Store>::get"),
            "Repo::get"
        );
    }

    #[test]
    fn test_shorten_generic_function() {
        assert_eq!(
            shorten_function_name("app::parse::<alloc::string::String>"),
            "parse"
        );
    }

    #[test]
    fn test_shorten_closure() {
        assert_eq!(
            shorten_function_name("app::run::{{closure}}"),
            "run::{{closure}}"
        );
        assert_eq!(
            shorten_function_name("app::run::{{closure}}::{{closure}}"),
            "run::{{closure}}::{{closure}}"
        );
    }

    #[test]
    fn test_shorten_drops_hash() {
        assert_eq!(
            shorten_function_name("app::db::query::h0123456789abcdef"),
            "query"
        );
    }

    #[test]
    fn test_symbol_crate() {
        assert_eq!(symbol_crate("std::rt::lang_start"), "std");
        assert_eq!(
            symbol_crate("<alloc::boxed::Box<F> as core::ops::FnOnce<()>>::call_once"),
            "alloc"
        );
        assert_eq!(symbol_crate("<&mut app::Repo>::load"), "app");
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            classify(
                "core::ops::function::FnOnce::call_once",
                "/rustc/0123456789abcdef0123456789abcdef01234567/library/core/src/ops/function.rs"
            ),
            FrameOrigin::Runtime
        );
        assert_eq!(
            classify(
                "<app::Job as core::ops::FnOnce<()>>::call_once",
                "/rustc/0123456789abcdef0123456789abcdef01234567/library/core/src/ops/function.rs"
            ),
            FrameOrigin::Runtime
        );
        assert_eq!(
            classify("faultline::builder::ErrorBuilder::wrap", LIBRARY_SRC),
            FrameOrigin::Library
        );
        assert_eq!(
            classify("faultline::builder::tests::wrap_keeps_cause", LIBRARY_SRC),
            FrameOrigin::User
        );
        assert_eq!(classify("app::main", "/work/app/src/main.rs"), FrameOrigin::User);
        assert_eq!(classify("main", "/build/glibc/csu/libc-start.c"), FrameOrigin::Runtime);
    }

    #[test]
    fn test_classify_registry_crates() {
        let path = "/home/u/.cargo/registry/src/index.crates.io-1949cf8c6b5b557f/backtrace-0.3.76/src/backtrace/mod.rs";
        assert_eq!(classify("backtrace::trace", path), FrameOrigin::Runtime);

        let path = "/home/u/.cargo/registry/src/index.crates.io-1949cf8c6b5b557f/tokio-1.47.1/src/runtime/mod.rs";
        assert_eq!(classify("tokio::runtime::block_on", path), FrameOrigin::User);
    }
}
