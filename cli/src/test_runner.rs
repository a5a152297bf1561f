use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use flexverb_interpreter::{ActionRegistry, WriterActions};

use crate::config::RegistryConfig;

const TEST_SUFFIX: &str = ".test.fv";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Verb table for this test. Defaults to the built-in registry.
    #[serde(default)]
    pub verbs: Option<BTreeMap<String, String>>,

    /// Expected exact stdout output (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// Expected runtime error; the error's Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// If true, the test expects parsing to fail.
    #[serde(default)]
    pub expect_parse_error: bool,
}

impl TestConfig {
    fn registry(&self) -> Result<ActionRegistry, String> {
        match &self.verbs {
            None => Ok(ActionRegistry::default()),
            Some(verbs) => RegistryConfig {
                verbs: verbs.clone(),
            }
            .into_registry()
            .map_err(|e| e.to_string()),
        }
    }
}

/// Split a `.test.fv` file into its TOML config and flexverb source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    if !content.starts_with("---") {
        return Err("missing opening --- frontmatter delimiter".into());
    }

    let after_open = &content[3..];
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..]; // skip \n---
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn fail(path: &Path, description: Option<String>, reason: impl Into<String>) -> Self {
        TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Fail(reason.into()),
        }
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return TestResult::fail(path, None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return TestResult::fail(path, None, format!("frontmatter error: {}", e)),
    };

    let description = config.description.clone();
    let outcome = check_expectations(&config, source);
    tracing::debug!(path = %path.display(), passed = outcome.is_none(), "ran test file");

    match outcome {
        None => TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        },
        Some(reason) => TestResult::fail(path, description, reason),
    }
}

/// Run `source` under `config`. Returns `Some(reason)` on mismatch.
fn check_expectations(config: &TestConfig, source: &str) -> Option<String> {
    let registry = match config.registry() {
        Ok(r) => r,
        Err(e) => return Some(format!("invalid verbs table: {}", e)),
    };

    let parse_result = flexverb::Parser::new(source, 0).parse_script();

    if config.expect_parse_error {
        return match parse_result {
            Err(_) => None,
            Ok(_) => Some("expected parse error, but parsing succeeded".into()),
        };
    }

    let script = match parse_result {
        Ok(s) => s,
        Err(errs) => {
            let msgs: Vec<String> = errs.iter().map(|e| e.to_string()).collect();
            return Some(format!("unexpected parse error: {}", msgs.join("; ")));
        }
    };

    let mut output_buf = Vec::new();
    let exec_result = flexverb_interpreter::execute_script(
        &script,
        &registry,
        &mut WriterActions::new(&mut output_buf),
    );

    match (&config.expect_error, &config.expect_output, exec_result) {
        (Some(expected_err), _, Err(runtime_err)) => {
            let err_str = runtime_err.to_string();
            if err_str.contains(expected_err.as_str()) {
                None
            } else {
                Some(format!(
                    "expected error containing \"{}\", got: {}",
                    expected_err, err_str
                ))
            }
        }
        (Some(expected_err), _, Ok(_)) => Some(format!(
            "expected error containing \"{}\", but execution succeeded",
            expected_err
        )),
        (None, _, Err(runtime_err)) => Some(format!("unexpected runtime error: {}", runtime_err)),
        (None, Some(expected_output), Ok(_)) => {
            let actual = String::from_utf8_lossy(&output_buf);
            let actual_trimmed = actual.trim();
            let expected_trimmed = expected_output.trim();
            if actual_trimmed == expected_trimmed {
                None
            } else {
                Some(format!(
                    "output mismatch\n  expected: {}\n  actual:   {}",
                    expected_trimmed, actual_trimmed
                ))
            }
        }
        (None, None, Ok(_)) => None,
    }
}

/// Discover test files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(TEST_SUFFIX) {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }
    for (category, files) in &categories {
        eprintln!("{:>4}  {}", files.len(), category_label(category));
    }
}

/// Pick the categories to run. A requested name also selects its
/// subcategories; names matching nothing are warned about and skipped.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> Vec<(&'a str, &'a [PathBuf])> {
    let wanted: Vec<&str> = requested.iter().map(|r| r.trim_matches('/')).collect();
    for name in &wanted {
        if !all.keys().any(|k| in_category(k, name)) {
            tracing::warn!(category = %name, "no such test category");
        }
    }
    all.iter()
        .filter(|(category, _)| {
            wanted.is_empty() || wanted.iter().any(|name| in_category(category, name))
        })
        .map(|(category, files)| (category.as_str(), files.as_slice()))
        .collect()
}

fn in_category(category: &str, name: &str) -> bool {
    category == name
        || category
            .strip_prefix(name)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Tallies results and prints them as they arrive.
struct Report {
    no_color: bool,
    passed: usize,
    failures: Vec<TestResult>,
}

impl Report {
    fn new(no_color: bool) -> Self {
        Report {
            no_color,
            passed: 0,
            failures: Vec::new(),
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn record(&mut self, result: TestResult) {
        let name = result.description.clone().unwrap_or_else(|| {
            result
                .path
                .file_name()
                .and_then(|s| s.to_str())
                .and_then(|s| s.strip_suffix(TEST_SUFFIX))
                .unwrap_or("?")
                .to_string()
        });
        match result.outcome {
            TestOutcome::Pass => {
                self.passed += 1;
                eprintln!("  {} {}", self.paint("ok  ", "32"), name);
            }
            TestOutcome::Fail(_) => {
                eprintln!("  {} {}", self.paint("FAIL", "31"), name);
                self.failures.push(result);
            }
        }
    }

    /// Print failure details and the totals. Returns the exit code.
    fn finish(self) -> i32 {
        for failure in &self.failures {
            if let TestOutcome::Fail(reason) = &failure.outcome {
                eprintln!("\n{}:", failure.path.display());
                for line in reason.lines() {
                    eprintln!("    {}", line);
                }
            }
        }
        let failed = self.failures.len();
        let verdict = if failed == 0 {
            self.paint("ok", "32")
        } else {
            self.paint("FAILED", "31")
        };
        eprintln!("\n{}: {} passed, {} failed", verdict, self.passed, failed);
        i32::from(failed > 0)
    }
}

/// Run every test file under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let all = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover_categorized(path)
    };
    let selected = if path.is_file() {
        select_categories(&all, &[])
    } else {
        select_categories(&all, categories)
    };
    if selected.is_empty() {
        eprintln!("no {} files to run under {}", TEST_SUFFIX, path.display());
        return 1;
    }

    let mut report = Report::new(no_color);
    for (category, files) in selected {
        eprintln!("\n{}", report.paint(category_label(category), "1"));
        for file in files {
            report.record(run_single_test(file));
        }
    }
    report.finish()
}
