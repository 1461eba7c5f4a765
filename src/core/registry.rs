//! # Test Registry / 测试注册表
//!
//! Merges the embedded catalog with the tests parsed from the external test
//! list into one ordered collection, builds requests from it, and narrows the
//! requests down to a single test on demand.
//!
//! 将嵌入式目录与从外部测试列表解析出的测试合并为一个有序集合，
//! 由其构建请求，并按需筛选到单个测试。

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::core::config::RunConfig;
use crate::core::models::{TestCase, TestRequest};
use crate::errors::ConfigError;

/// Parses a test list: one `name input output [args...]` test per line.
///
/// Blank lines and lines starting with `#` are ignored. `origin` is only used
/// in error messages.
pub fn parse_test_list(text: &str, origin: &Path) -> Result<Vec<TestCase>, ConfigError> {
    let mut cases = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let (Some(name), Some(input), Some(output)) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ConfigError::MalformedLine {
                path: origin.to_path_buf(),
                line: index + 1,
                found: trimmed.to_string(),
            });
        };
        let args = tokens.map(str::to_string).collect();
        cases.push(TestCase::new(name, input, output, args));
    }
    Ok(cases)
}

/// Reads and parses the test list at `path`.
pub fn load_test_list(path: &Path) -> Result<Vec<TestCase>, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadTestList {
        path: path.to_path_buf(),
        source,
    })?;
    parse_test_list(&text, path)
}

/// The merged, ordered collection of every known test.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    cases: Vec<TestCase>,
}

impl Registry {
    /// Embedded entries first, then listed entries in file order.
    /// Fails on the first duplicated name.
    pub fn merge(embedded: Vec<TestCase>, listed: Vec<TestCase>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut cases = Vec::with_capacity(embedded.len() + listed.len());
        for case in embedded.into_iter().chain(listed) {
            if !seen.insert(case.name.clone()) {
                return Err(ConfigError::DuplicateName(case.name));
            }
            cases.push(case);
        }
        Ok(Self { cases })
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.cases.iter().any(|case| case.name == name)
    }

    /// Builds a request per test, in registry order.
    pub fn requests(&self, cfg: &RunConfig) -> Vec<TestRequest> {
        self.cases
            .iter()
            .map(|case| TestRequest::from_case(case, cfg))
            .collect()
    }
}

/// Keeps only the request named `only` (when given) and checks that
/// something is left to run.
///
/// An unknown name and a selection with nothing runnable are distinct errors
/// so "never existed" can be told from "exists but is skipped".
pub fn select(requests: Vec<TestRequest>, only: Option<&str>) -> Result<Vec<TestRequest>, ConfigError> {
    let selected: Vec<TestRequest> = match only {
        Some(name) => {
            let selected: Vec<_> = requests.into_iter().filter(|req| req.name == name).collect();
            if selected.is_empty() {
                return Err(ConfigError::UnknownTest(name.to_string()));
            }
            if let [TestRequest {
                skip_reason: Some(reason),
                ..
            }] = selected.as_slice()
            {
                return Err(ConfigError::TestSkipped {
                    name: name.to_string(),
                    reason: reason.clone(),
                });
            }
            selected
        }
        None => requests,
    };

    let skipped = selected.iter().filter(|req| req.is_skipped()).count();
    if skipped == selected.len() {
        return Err(ConfigError::NoRunnableTests {
            selected: selected.len(),
            skipped,
        });
    }
    Ok(selected)
}
