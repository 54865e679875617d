use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use yaml_rust::{Yaml, YamlLoader};

/// Environment variables parsed from a dotenv-style file.
///
/// Keys are unique and kept sorted so the rendered YAML is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMapping {
    vars: BTreeMap<String, String>,
}

impl EnvMapping {
    /// Parse dotenv-style content.
    ///
    /// Blank lines and `#` comment lines are skipped. Anything after a `#`
    /// is dropped, even inside quotes, so values cannot contain a literal `#`.
    /// The line is split on the first `=`, both sides are trimmed, and one
    /// matching pair of surrounding `"` or `'` is removed from the value.
    /// `KEY="#fff"` is cut down to `KEY="`, whose lone quote strips to an
    /// empty value.
    /// Lines without `=` or with an empty key are ignored; a repeated key
    /// keeps its last value.
    pub fn parse(content: &str) -> Self {
        content
            .lines()
            .filter_map(parse_line)
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Whether `key` is present with a non-empty value.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a flat YAML mapping for `gcloud run deploy --env-vars-file`.
    ///
    /// gcloud reads the file with a YAML 1.1 loader, which resolves far more
    /// plain scalars than YAML 1.2 does (`yes`, `1_000`, `2024-01-01`, `0o17`).
    /// Only keys and values that cannot be resolved as anything but a string
    /// are written bare; everything else is double-quoted. The rendered text
    /// is loaded back and must map every key to the same string.
    pub fn to_yaml(&self) -> crate::Result<String> {
        if self.vars.is_empty() {
            return Ok("{}\n".to_owned());
        }

        let mut out = String::new();
        for (key, value) in &self.vars {
            push_scalar(&mut out, key);
            out.push_str(": ");
            push_scalar(&mut out, value);
            out.push('\n');
        }

        self.check_round_trip(&out)?;
        Ok(out)
    }

    fn check_round_trip(&self, rendered: &str) -> crate::Result<()> {
        let docs = YamlLoader::load_from_str(rendered)
            .map_err(|e| crate::Error::EnvVarsRender { source: e })?;
        let hash = docs.first().and_then(Yaml::as_hash);

        for (key, value) in &self.vars {
            let loaded = hash.and_then(|h| h.get(&Yaml::String(key.clone())));
            if loaded.and_then(Yaml::as_str) != Some(value.as_str()) {
                return Err(crate::Error::EnvVarsRetyped { key: key.clone() });
            }
        }
        Ok(())
    }
}

/// Words a YAML 1.1 or 1.2 loader resolves to a bool, null or float.
const RESERVED_WORDS: &[&str] = &[
    "y", "n", "yes", "no", "true", "false", "on", "off", "null", "inf", "infinity", "nan",
];

/// Whether `s` reads back as the same string when written as a plain scalar.
///
/// Every YAML 1.1 number, timestamp and special value starts with a digit,
/// a sign, a dot or a symbol, so a letter first plus a small alphabet rules
/// them all out except the reserved words.
fn is_plain_safe(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_alphabetic())
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
        && !RESERVED_WORDS.iter().any(|w| s.eq_ignore_ascii_case(w))
}

fn push_scalar(out: &mut String, s: &str) {
    if is_plain_safe(s) {
        out.push_str(s);
        return;
    }

    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
}

impl FromIterator<(String, String)> for EnvMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

/// Read and parse an env file.
///
/// A missing file is reported through tracing and yields an empty mapping;
/// callers decide whether an empty mapping is fatal.
pub fn parse_env_file(path: &Path) -> crate::Result<EnvMapping> {
    if !path.exists() {
        tracing::error!(path = %path.display(), "env file not found");
        return Ok(EnvMapping::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| crate::Error::EnvFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let env = EnvMapping::parse(&content);
    tracing::debug!(path = %path.display(), count = env.len(), "parsed env file");
    Ok(env)
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let line = match line.split_once('#') {
        Some((before, _)) => before.trim(),
        None => line,
    };

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key, strip_quotes(value.trim())))
}

/// Drop one surrounding pair of `"` or `'`. A value that is a single quote
/// character both starts and ends with it, so it becomes empty.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.starts_with(quote) && value.ends_with(quote) {
            return value.get(1..value.len() - 1).unwrap_or("");
        }
    }
    value
}

/// The rendered env mapping on disk, removed when dropped.
///
/// Dropping covers early returns, `?` propagation, panics, and a cancelled
/// future alike; [`EnvVarsFile::close`] removes it explicitly and reports
/// failures.
#[derive(Debug)]
pub struct EnvVarsFile {
    file: tempfile::NamedTempFile,
}

impl EnvVarsFile {
    /// Write `env` as YAML to a fresh file inside `dir`.
    pub fn create_in(env: &EnvMapping, dir: &Path) -> crate::Result<Self> {
        let yaml = env.to_yaml()?;
        let write_err = |e| crate::Error::EnvVarsWrite {
            dir: dir.to_path_buf(),
            source: e,
        };

        let mut file = tempfile::Builder::new()
            .prefix("env_vars_")
            .suffix(".yaml")
            .tempfile_in(dir)
            .map_err(write_err)?;
        file.write_all(yaml.as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;

        tracing::debug!(path = %file.path().display(), "wrote env vars file");
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn close(self) -> crate::Result<()> {
        let path = self.file.path().to_path_buf();
        self.file
            .close()
            .map_err(|e| crate::Error::EnvVarsRemove { path, source: e })
    }
}
