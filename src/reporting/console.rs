//! # Console Reporting Module / 控制台报告模块
//!
//! Prints each verdict as it arrives and a colorful summary at the end,
//! with internationalization support.
//!
//! 在结果到达时打印每个结论，并在结束时打印彩色摘要，支持国际化。

use colored::*;
use std::time::Instant;

use crate::core::models::{CompletedTest, TestResult, TestState};
use crate::infra::t;

/// Aggregate counts of terminal states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub timed_out: usize,
}

impl RunCounts {
    pub fn record(&mut self, result: &TestResult) {
        match result.state() {
            TestState::Passed => self.passed += 1,
            TestState::Failed => self.failed += 1,
            TestState::Skipped => self.skipped += 1,
            TestState::TimedOut => self.timed_out += 1,
        }
    }

    pub fn completed(&self) -> usize {
        self.passed + self.failed + self.skipped + self.timed_out
    }

    /// `true` when nothing failed or timed out.
    pub fn success(&self) -> bool {
        self.failed == 0 && self.timed_out == 0
    }
}

/// Accumulates results and prints them as they complete.
///
/// 累积结果并在其完成时打印。
#[derive(Debug)]
pub struct Reporter {
    locale: String,
    print_passed: bool,
    total: usize,
    counts: RunCounts,
    started: Instant,
}

impl Reporter {
    pub fn new(locale: &str, print_passed: bool, total: usize) -> Self {
        Self {
            locale: locale.to_string(),
            print_passed,
            total,
            counts: RunCounts::default(),
            started: Instant::now(),
        }
    }

    pub fn counts(&self) -> RunCounts {
        self.counts
    }

    /// Records one result and prints it if it is worth printing.
    ///
    /// Passed tests print nothing unless `print_passed` was requested.
    /// Every other verdict prints a self-contained block.
    pub fn report(&mut self, done: &CompletedTest) {
        self.counts.record(&done.result);
        let locale = self.locale.as_str();
        let progress = format!("[{}/{}]", self.counts.completed(), self.total).dimmed();

        match &done.result {
            TestResult::Passed { duration } => {
                if self.print_passed {
                    println!(
                        "{} {}",
                        progress,
                        t!(
                            "run.test_passed",
                            locale = locale,
                            name = done.name,
                            duration = format!("{:.3}", duration.as_secs_f64())
                        )
                        .green()
                    );
                }
            }
            TestResult::Skipped { reason } => {
                println!(
                    "{} {}",
                    progress,
                    t!("run.test_skipped", locale = locale, name = done.name, reason = reason)
                        .yellow()
                );
            }
            TestResult::TimedOut { budget } => {
                println!(
                    "{} {}",
                    progress,
                    t!(
                        "run.test_timeout",
                        locale = locale,
                        name = done.name,
                        timeout = budget.as_secs()
                    )
                    .red()
                    .bold()
                );
            }
            TestResult::Failed { reason, diagnostic } => {
                println!(
                    "{} {}",
                    progress,
                    t!("run.test_failed", locale = locale, name = done.name).red().bold()
                );
                println!("    {} {}", t!("run.reason", locale = locale).yellow(), reason);
                if !diagnostic.trim().is_empty() {
                    println!("{}", "-".repeat(80));
                    println!("{}", diagnostic.trim_end());
                    println!("{}", "-".repeat(80));
                }
            }
        }
    }

    /// Prints the final counts and returns them.
    pub fn finish(self) -> RunCounts {
        let locale = self.locale.as_str();
        let counts = self.counts;

        println!("\n{}", t!("summary.banner", locale = locale).bold());
        println!("  {}", t!("summary.passed", locale = locale, count = counts.passed).green());
        let failed = t!("summary.failed", locale = locale, count = counts.failed);
        if counts.failed > 0 {
            println!("  {}", failed.red());
        } else {
            println!("  {}", failed);
        }
        if counts.timed_out > 0 {
            println!(
                "  {}",
                t!("summary.timed_out", locale = locale, count = counts.timed_out).red()
            );
        }
        println!(
            "  {}",
            t!("summary.skipped", locale = locale, count = counts.skipped).yellow()
        );

        let not_run = self.total.saturating_sub(counts.completed());
        if not_run > 0 {
            println!(
                "  {}",
                t!("summary.not_run", locale = locale, count = not_run).dimmed()
            );
        }
        println!(
            "  {}",
            t!(
                "summary.elapsed",
                locale = locale,
                seconds = format!("{:.2}", self.started.elapsed().as_secs_f64())
            )
        );

        if counts.success() {
            println!("\n{}", t!("summary.all_passed", locale = locale).green().bold());
        } else {
            println!("\n{}", t!("summary.some_failed", locale = locale).red().bold());
        }
        counts
    }
}
