//! Test-case plan documents.
//!
//! A plan is a list of modules, each split into groups of test cases. It is
//! lowered to ordinary operations, with a per-module priority summary
//! computed from the cases.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::op::{Operation, Table};

const CASE_COLUMNS: [&str; 4] = ["Test ID", "Test Case", "Expected Result", "Priority"];
const SUMMARY_COLUMNS: [&str; 5] = ["Module", "Test Cases", "High Priority", "Medium", "Low"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub case: String,
    pub expected: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestGroup {
    pub title: String,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestModule {
    pub title: String,
    /// Name used in the summary table; defaults to the title.
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub groups: Vec<TestGroup>,
}

impl TestModule {
    pub fn summary_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.title)
    }

    pub fn cases(&self) -> impl Iterator<Item = &TestCase> {
        self.groups.iter().flat_map(|group| group.cases.iter())
    }

    pub fn counts(&self) -> PriorityCounts {
        self.cases()
            .fold(PriorityCounts::default(), |counts, case| counts.with(case.priority))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverviewEntry {
    pub aspect: String,
    pub details: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestPlan {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub overview: Vec<OverviewEntry>,
    #[serde(default)]
    pub modules: Vec<TestModule>,
    /// Closing paragraphs, e.g. version and date lines.
    #[serde(default)]
    pub footer: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityCounts {
    fn with(mut self, priority: Priority) -> Self {
        match priority {
            Priority::High => self.high += 1,
            Priority::Medium => self.medium += 1,
            Priority::Low => self.low += 1,
        }
        self
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    fn add(self, other: Self) -> Self {
        Self {
            high: self.high + other.high,
            medium: self.medium + other.medium,
            low: self.low + other.low,
        }
    }

    fn row(&self, name: &str) -> Vec<String> {
        vec![
            name.to_string(),
            self.total().to_string(),
            self.high.to_string(),
            self.medium.to_string(),
            self.low.to_string(),
        ]
    }
}

impl TestPlan {
    pub fn from_toml(content: &str) -> Result<Self> {
        let plan: Self = toml::from_str(content).map_err(Error::Plan)?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Reject plans that reuse a test id.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for case in self.modules.iter().flat_map(|module| module.cases()) {
            if !seen.insert(case.id.as_str()) {
                return Err(Error::DuplicateTestId {
                    id: case.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Summary table: one row per module and a TOTAL footer.
    pub fn summary_table(&self) -> Table {
        let mut table = Table::new(SUMMARY_COLUMNS.iter().map(|c| c.to_string()).collect());
        let mut total = PriorityCounts::default();

        for module in &self.modules {
            let counts = module.counts();
            table.rows.push(counts.row(module.summary_name()));
            total = total.add(counts);
        }

        table.footer = Some(total.row("TOTAL"));
        table
    }

    /// Lower the plan to document operations.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops = vec![Operation::heading(0, &self.title)];

        if !self.summary.trim().is_empty() {
            ops.push(Operation::heading(1, "Executive Summary"));
            ops.push(Operation::paragraph(self.summary.trim()));
        }

        if !self.overview.is_empty() {
            ops.push(Operation::heading(1, "Project Overview"));
            let rows = self
                .overview
                .iter()
                .map(|entry| vec![entry.aspect.clone(), entry.details.clone()])
                .collect();
            ops.push(Operation::Table(Table::plain(rows)));
        }

        for (n, module) in self.modules.iter().enumerate() {
            ops.push(Operation::heading(1, format!("{}. {}", n + 1, module.title)));

            for (m, group) in module.groups.iter().enumerate() {
                ops.push(Operation::heading(
                    2,
                    format!("{}.{} {}", n + 1, m + 1, group.title),
                ));
                if group.cases.is_empty() {
                    continue;
                }

                let mut table = Table::new(CASE_COLUMNS.iter().map(|c| c.to_string()).collect());
                table.rows = group
                    .cases
                    .iter()
                    .map(|case| {
                        vec![
                            case.id.clone(),
                            case.case.clone(),
                            case.expected.clone(),
                            case.priority.as_str().to_string(),
                        ]
                    })
                    .collect();
                ops.push(Operation::Table(table));
            }
        }

        ops.push(Operation::heading(1, "Appendix: Test Count Summary"));
        ops.push(Operation::Table(self.summary_table()));

        ops.extend(self.footer.iter().map(|line| Operation::paragraph(line.as_str())));
        ops
    }
}
