use crate::cache::get_or_compile;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source dialect of the project's native Android layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Statements end with `;`, `extends`/`implements` inheritance.
    Java,
    /// No statement terminator, `: Base(), Interface` inheritance.
    Kotlin,
}

impl Dialect {
    /// Per-dialect grammar fragments.
    pub fn grammar(self) -> &'static Grammar {
        match self {
            Dialect::Java => &JAVA,
            Dialect::Kotlin => &KOTLIN,
        }
    }

    /// Statement terminator (`";"` or empty).
    pub fn terminator(self) -> &'static str {
        self.grammar().terminator
    }

    /// Source file extension without the dot.
    pub fn extension(self) -> &'static str {
        self.grammar().extension
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Java => write!(f, "java"),
            Dialect::Kotlin => write!(f, "kotlin"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "java" => Ok(Dialect::Java),
            "kotlin" | "kt" => Ok(Dialect::Kotlin),
            other => Err(format!("unknown dialect '{other}' (expected java or kotlin)")),
        }
    }
}

/// Pattern templates for one dialect.
///
/// `{name}` in a template is replaced by the regex-escaped identifier.
#[derive(Debug)]
pub struct Grammar {
    class_decl: &'static str,
    method_decl: &'static str,
    package_decl: &'static str,
    import_stmt: &'static str,
    terminator: &'static str,
    extension: &'static str,
}

static JAVA: Grammar = Grammar {
    class_decl: r"class\s+{name}(\s+extends\s+\S+)?(\s+implements\s+\S+)?\s*\{",
    method_decl: r"(public|protected|private)\s+(static\s+)?\S+\s+{name}\s*\(",
    package_decl: r"package\s+[\w.]+;",
    import_stmt: r"import\s+{name};",
    terminator: ";",
    extension: "java",
};

static KOTLIN: Grammar = Grammar {
    class_decl: r"class\s+{name}\s*:\s*\S+\(\)\s*,?\s*(\S+\s*)?\{",
    method_decl: r"override\s+fun\s+{name}\s*\(\)",
    package_decl: r"package\s+[\w.]+",
    import_stmt: r"(?m)import\s+{name}\s*$",
    terminator: "",
    extension: "kt",
};

fn fill(template: &str, name: &str) -> String {
    template.replace("{name}", &regex::escape(name))
}

impl Grammar {
    pub fn class_regex(&self, class: &str) -> Result<Regex, regex::Error> {
        get_or_compile(&fill(self.class_decl, class))
    }

    pub fn method_regex(&self, method: &str) -> Result<Regex, regex::Error> {
        get_or_compile(&fill(self.method_decl, method))
    }

    pub fn package_regex(&self) -> Result<Regex, regex::Error> {
        get_or_compile(self.package_decl)
    }

    pub fn import_regex(&self, path: &str) -> Result<Regex, regex::Error> {
        get_or_compile(&fill(self.import_stmt, path))
    }

    /// The import statement as it is written into source.
    pub fn import_statement(&self, path: &str) -> String {
        format!("import {path}{}", self.terminator)
    }
}
