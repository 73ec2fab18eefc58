//! Report rendering via `minijinja`.
//!
//! Three templates turn a run into text: the run-log row, the status
//! summary sentence, and the README status block. Defaults live in
//! [`TemplateConfig`]; operators can override any of them from
//! `ulam-config.yaml` without recompiling.

use chrono::NaiveDate;
use minijinja::{Environment, UndefinedBehavior, context};

use crate::config::TemplateConfig;

/// Template names registered in the environment.
const LOG_ENTRY: &str = "log_entry";
const SUMMARY: &str = "summary";
const STATUS_BLOCK: &str = "status_block";

/// Errors raised while compiling or rendering a report template.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// A template failed to compile.
    #[error("failed to compile {name} template: {source}")]
    Compile {
        /// Which template.
        name: &'static str,
        /// The underlying template error.
        source: minijinja::Error,
    },

    /// A template failed to render.
    #[error("failed to render {name} template: {source}")]
    Render {
        /// Which template.
        name: &'static str,
        /// The underlying template error.
        source: minijinja::Error,
    },
}

/// Renders run reports from the configured templates.
pub struct Reporter {
    env: Environment<'static>,
}

impl core::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}

impl Reporter {
    /// Compile every template in `templates`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Compile`] if any template has a syntax error.
    pub fn new(templates: &TemplateConfig) -> Result<Self, ReportError> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        for (name, text) in [
            (LOG_ENTRY, &templates.log_entry),
            (SUMMARY, &templates.summary),
            (STATUS_BLOCK, &templates.status_block),
        ] {
            env.add_template_owned(name, text.clone())
                .map_err(|source| ReportError::Compile { name, source })?;
        }

        Ok(Self { env })
    }

    /// One run-log row: counter, date, and the fenced grid snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Render`] if the template fails.
    pub fn log_entry(&self, n: u64, date: NaiveDate, grid: &str) -> Result<String, ReportError> {
        self.render(
            LOG_ENTRY,
            context! {
                n => n,
                date => date.to_string(),
                grid => grid,
            },
        )
    }

    /// The status sentence for a run that reached `n` and found
    /// `primes_found` primes in its batch.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Render`] if the template fails.
    pub fn summary(
        &self,
        n: u64,
        primes_found: usize,
        total_primes: usize,
    ) -> Result<String, ReportError> {
        self.render(
            SUMMARY,
            context! {
                n => n,
                primes_found => primes_found,
                total_primes => total_primes,
            },
        )
    }

    /// The README region body wrapping `summary`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Render`] if the template fails.
    pub fn status_block(&self, summary: &str) -> Result<String, ReportError> {
        self.render(STATUS_BLOCK, context! { summary => summary })
    }

    fn render(&self, name: &'static str, ctx: minijinja::Value) -> Result<String, ReportError> {
        self.env
            .get_template(name)
            .and_then(|tpl| tpl.render(ctx))
            .map_err(|source| ReportError::Render { name, source })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reporter() -> Reporter {
        Reporter::new(&TemplateConfig::default()).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn log_entry_fences_the_grid() {
        let entry = reporter().log_entry(15, date(), " 1█\n   ").unwrap();
        assert_eq!(entry, "| 15 | 2026-10-19 |\n```\n 1█\n   \n``` |\n");
    }

    #[test]
    fn summary_reports_batch_count() {
        let summary = reporter().summary(15, 2, 6).unwrap();
        assert!(summary.starts_with("The prime search has reached N=15. "));
        assert!(summary.contains("Today, 2 new primes (celestial bodies) were discovered"));
        assert!(summary.ends_with("more visible in the project's grid."));
    }

    #[test]
    fn status_block_is_a_blockquote() {
        assert_eq!(reporter().status_block("hello").unwrap(), "\n> hello\n");
    }

    #[test]
    fn markup_is_not_escaped() {
        let block = reporter().status_block("<b>&</b>").unwrap();
        assert_eq!(block, "\n> <b>&</b>\n");
    }

    #[test]
    fn custom_templates_are_used() {
        let templates = TemplateConfig {
            summary: "{{ n }}:{{ primes_found }}/{{ total_primes }}".to_owned(),
            ..TemplateConfig::default()
        };
        let reporter = Reporter::new(&templates).unwrap();
        assert_eq!(reporter.summary(100, 3, 25).unwrap(), "100:3/25");
    }

    #[test]
    fn syntax_error_fails_at_compile() {
        let templates = TemplateConfig {
            log_entry: "{{ n ".to_owned(),
            ..TemplateConfig::default()
        };
        assert!(matches!(
            Reporter::new(&templates),
            Err(ReportError::Compile { name: "log_entry", .. })
        ));
    }

    #[test]
    fn unknown_variable_fails_at_render() {
        let templates = TemplateConfig {
            summary: "{{ missing }}".to_owned(),
            ..TemplateConfig::default()
        };
        let reporter = Reporter::new(&templates).unwrap();
        assert!(matches!(
            reporter.summary(1, 0, 0),
            Err(ReportError::Render { name: "summary", .. })
        ));
    }
}
