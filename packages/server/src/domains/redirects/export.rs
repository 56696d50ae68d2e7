//! Rendering redirect lists as web-server rules or CSV.

use serde::Deserialize;
use std::fmt::Write;

use crate::domains::redirects::models::RedirectView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Apache `Redirect 301` lines
    Htaccess,
    /// nginx `rewrite ... permanent;` lines
    Nginx,
    Csv,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Htaccess => "redirects.htaccess",
            ExportFormat::Nginx => "redirects.nginx.conf",
            ExportFormat::Csv => "redirects.csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            _ => "text/plain; charset=utf-8",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "htaccess" => Ok(ExportFormat::Htaccess),
            "nginx" => Ok(ExportFormat::Nginx),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(anyhow::anyhow!("unknown export format: {}", other)),
        }
    }
}

/// One line per redirect, in the given order, each terminated by `\n`.
/// URLs are written verbatim.
pub fn render_export(format: ExportFormat, redirects: &[RedirectView]) -> String {
    let mut out = String::new();

    if format == ExportFormat::Csv {
        out.push_str("old_url,new_url,confidence,method\n");
    }

    for r in redirects {
        // Writing into a String cannot fail
        let _ = match format {
            ExportFormat::Htaccess => writeln!(out, "Redirect 301 {} {}", r.old_url, r.new_url),
            ExportFormat::Nginx => {
                writeln!(out, "rewrite ^{}$ {} permanent;", r.old_url, r.new_url)
            }
            ExportFormat::Csv => writeln!(
                out,
                "{},{},{},{}",
                r.old_url, r.new_url, r.confidence_score, r.match_type
            ),
        };
    }

    out
}
