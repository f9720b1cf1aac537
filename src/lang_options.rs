use std::path::Path;

/// Source language the compiler is told to expect
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Language {
    Asm,
    C,
    C99,
    Cpp,
    Cpp11,
    /// no `-x` flag, the compiler guesses per file
    #[default]
    None,
}

impl Language {
    pub fn is_cpp(self) -> bool {
        matches!(self, Language::Cpp | Language::Cpp11)
    }

    /// Language-specific flags placed right after the compiler name
    pub fn base_flags(self) -> &'static [&'static str] {
        match self {
            Language::Asm => &["-x", "asm"],
            Language::C => &["-x", "c", "-ansi"],
            Language::C99 => &["-x", "c", "-std=c99"],
            Language::Cpp => &["-x", "c++", "-ansi", "-fexceptions"],
            Language::Cpp11 => &["-x", "c++", "-std=c++0x", "-fexceptions"],
            Language::None => &[],
        }
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        match s {
            "asm" => Language::Asm,
            "c" | "c89" => Language::C,
            "c99" => Language::C99,
            "cpp" | "c++" => Language::Cpp,
            "c++0x" | "c++1x" => Language::Cpp11,
            _ => Language::None, // flex, none
        }
    }
}

/// What an input file is, judged by its extension
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileKind {
    Asm,
    C,
    Cpp,
    Flex,
    None,
}

impl FileKind {
    fn language(self) -> Option<Language> {
        match self {
            FileKind::Asm => Some(Language::Asm),
            FileKind::C => Some(Language::C),
            FileKind::Cpp => Some(Language::Cpp),
            FileKind::Flex | FileKind::None => None,
        }
    }
}

/// Classify a file by extension. Matching ignores case for every kind.
pub fn classify(path: &Path) -> FileKind {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FileKind::None;
    };
    match ext.to_ascii_lowercase().as_str() {
        "s" | "asm" => FileKind::Asm,
        "c" => FileKind::C,
        "cpp" | "cxx" | "cc" | "cp" | "c++" => FileKind::Cpp,
        "l" => FileKind::Flex,
        _ => FileKind::None,
    }
}

/// Pick the language shared by every recognised source file.
///
/// Lexer inputs and unknown files are ignored. If the remaining files disagree, or
/// none remain, the result is [`Language::None`].
pub fn derive_language<P: AsRef<Path>>(files: &[P]) -> Language {
    let mut found = None;
    for lang in files.iter().filter_map(|f| classify(f.as_ref()).language()) {
        match found {
            None => found = Some(lang),
            Some(prev) if prev != lang => return Language::None,
            Some(_) => {}
        }
    }
    found.unwrap_or_default()
}
