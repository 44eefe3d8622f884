//! Syntax-highlighting labels and binary sniffing for transcribed files.

/// Number of leading bytes inspected by [`looks_binary`]
pub const BINARY_SAMPLE_LEN: usize = 512;

/// Share of suspicious bytes above which a sample counts as binary
const BINARY_THRESHOLD: f64 = 0.2;

const LANGUAGE_LABELS: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("py", "python"),
    ("go", "go"),
    ("java", "java"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("hpp", "cpp"),
    ("cxx", "cpp"),
    ("cs", "csharp"),
    ("rb", "ruby"),
    ("php", "php"),
    ("swift", "swift"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("rs", "rust"),
    ("ts", "typescript"),
    ("html", "html"),
    ("htm", "html"),
    ("css", "css"),
    ("json", "json"),
    ("xml", "xml"),
    ("md", "markdown"),
    ("sh", "shell"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("dockerfile", "dockerfile"),
];

// Extensions that are always treated as text, whatever the sample says.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "rst", "adoc", "csv", "tsv", "log", "ini", "cfg", "conf", "env", "json", "yaml",
    "yml", "toml", "xml", "html", "htm", "css", "svg", "js", "ts", "py", "rs", "go", "c", "h",
    "cpp", "hpp", "java", "kt", "rb", "php", "sh", "sql", "lock",
];

/// Lower-cased extension after the last dot of the file name in `path`, if any
pub fn extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let dot = name.rfind('.')?;
    if dot + 1 >= name.len() {
        return None;
    }
    Some(name[dot + 1..].to_lowercase())
}

/// Code-fence label for a file path
///
/// Known extensions map to their highlighter name, unknown ones pass
/// through unchanged and a path without extension yields an empty label.
pub fn fence_label(path: &str) -> String {
    match extension(path) {
        Some(ext) => LANGUAGE_LABELS
            .iter()
            .find(|(known, _)| *known == ext)
            .map(|(_, label)| (*label).to_string())
            .unwrap_or(ext),
        None => String::new(),
    }
}

/// Whether the extension of `path` is known to hold text
pub fn is_known_text(path: &str) -> bool {
    extension(path)
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Heuristic binary check over the first [`BINARY_SAMPLE_LEN`] bytes
///
/// A byte is suspicious when it is NUL or outside printable ASCII, with tab,
/// CR and LF allowed. An empty sample is text.
pub fn looks_binary(content: &[u8]) -> bool {
    let sample = &content[..content.len().min(BINARY_SAMPLE_LEN)];
    if sample.is_empty() {
        return false;
    }
    let suspicious = sample
        .iter()
        .filter(|&&b| !(matches!(b, b'\t' | b'\n' | b'\r') || (0x20..0x7f).contains(&b)))
        .count();
    suspicious as f64 / sample.len() as f64 > BINARY_THRESHOLD
}

/// Binary check that defers to the text allow-list first
pub fn is_binary_file(path: &str, content: &[u8]) -> bool {
    !is_known_text(path) && looks_binary(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("src/main.py", "python")]
    #[test_case("lib.RS", "rust")]
    #[test_case("docs/readme.md", "markdown")]
    #[test_case("include/vec.hpp", "cpp")]
    #[test_case("ci/config.yml", "yaml")]
    #[test_case("build/Dockerfile.dockerfile", "dockerfile")]
    #[test_case("data/file.parquet", "parquet")]
    #[test_case("Makefile", "")]
    #[test_case("weird.", "")]
    #[test_case(".github/CODEOWNERS", "")]
    #[test_case("v1.2/Makefile", "")]
    #[test_case("pkg.v2/src/lib.rs", "rust")]
    fn test_fence_label(path: &str, expected: &str) {
        assert_eq!(fence_label(path), expected);
    }

    #[test]
    fn test_dotfile_extension() {
        assert_eq!(fence_label(".gitignore"), "gitignore");
    }

    #[test]
    fn test_directory_dots_are_not_extensions() {
        assert!(!is_known_text("notes.md/LICENSE"));
        assert!(is_known_text("v1.2/notes.md"));
    }

    #[test]
    fn test_text_is_not_binary() {
        assert!(!looks_binary(b"fn main() {\n\tprintln!(\"hi\");\r\n}\n"));
        assert!(!looks_binary(b""));
    }

    #[test]
    fn test_nul_heavy_sample_is_binary() {
        let mut bytes = vec![0u8; 100];
        bytes.extend_from_slice(b"PNG header and some text that follows");
        assert!(looks_binary(&bytes));
    }

    #[test]
    fn test_threshold_is_strict() {
        // exactly 20% suspicious is still text
        let mut bytes = vec![b'a'; 80];
        bytes.extend(std::iter::repeat(0xffu8).take(20));
        assert!(!looks_binary(&bytes));
        bytes.push(0xff);
        assert!(looks_binary(&bytes));
    }

    #[test]
    fn test_only_first_sample_counts() {
        let mut bytes = vec![b'x'; BINARY_SAMPLE_LEN];
        bytes.extend(std::iter::repeat(0u8).take(4096));
        assert!(!looks_binary(&bytes));
    }

    #[test]
    fn test_allow_list_overrides_sniffing() {
        let utf8 = "日本語のテキスト".repeat(10);
        assert!(looks_binary(utf8.as_bytes()));
        assert!(!is_binary_file("notes/readme.md", utf8.as_bytes()));
        assert!(is_binary_file("assets/logo.bin", &[0u8; 64]));
    }
}
