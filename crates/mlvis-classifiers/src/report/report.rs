//! Self-contained HTML reports made of titled sections.
//!
//! Each section holds free-form maud markup and any number of plotly plots.
//! The plotly.js bundle is loaded from the CDN, so the written file needs no
//! other assets.
use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use plotly::Plot;
use std::fs;
use std::path::Path;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

enum Block {
    Content(Markup),
    Plot(Plot),
}

pub struct ReportSection {
    title: String,
    blocks: Vec<Block>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            blocks: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.blocks.push(Block::Content(content));
    }

    pub fn add_plot(&mut self, plot: Plot) {
        self.blocks.push(Block::Plot(plot));
    }

    fn render(&self, section_idx: usize) -> Markup {
        html! {
            section {
                h2 { (self.title) }
                @for (block_idx, block) in self.blocks.iter().enumerate() {
                    @match block {
                        Block::Content(markup) => {
                            div class="content" { (markup) }
                        }
                        Block::Plot(plot) => {
                            @let div_id = format!("plot-{}-{}", section_idx, block_idx);
                            div class="plot" {
                                (PreEscaped(plot.to_inline_html(Some(div_id.as_str()))))
                            }
                        }
                    }
                }
            }
        }
    }
}

pub struct Report {
    software: String,
    version: String,
    title: String,
    sections: Vec<ReportSection>,
}

impl Report {
    pub fn new(software: &str, version: &str, title: &str) -> Self {
        Self {
            software: software.to_string(),
            version: version.to_string(),
            title: title.to_string(),
            sections: Vec::new(),
        }
    }

    pub fn add_section(&mut self, section: ReportSection) {
        self.sections.push(section);
    }

    pub fn render(&self) -> Markup {
        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="utf-8";
                    title { (self.title) }
                    script src=(PLOTLY_CDN) {}
                    style {
                        "body { font-family: sans-serif; margin: 2em; }
                         section { margin-bottom: 2em; }
                         .code-container { background-color: #f5f5f5; padding: 10px; border-radius: 5px; overflow-x: auto; font-family: monospace; white-space: pre-wrap; }"
                    }
                }
                body {
                    h1 { (self.title) }
                    p class="meta" {
                        (self.software) " " (self.version) " | generated " (generated)
                    }
                    @for (idx, section) in self.sections.iter().enumerate() {
                        (section.render(idx))
                    }
                }
            }
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(path, self.render().into_string())
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        log::info!("Report saved to {}", path.display());
        Ok(())
    }
}

/// Pretty-printed JSON inside a code block, used for configuration sections.
pub fn json_block<T: serde::Serialize>(value: &T) -> Result<Markup> {
    let json = serde_json::to_string_pretty(value)?;
    Ok(html! {
        div class="code-container" {
            pre { code { (json) } }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotly::Scatter;

    #[test]
    fn report_contains_sections_and_plots() {
        let mut report = Report::new("mlvis", "0.1.0", "Test Report");
        let mut section = ReportSection::new("Overview");
        section.add_content(html! { "hello report" });
        let mut plot = Plot::new();
        plot.add_trace(Scatter::new(vec![1.0, 2.0], vec![3.0, 4.0]));
        section.add_plot(plot);
        report.add_section(section);

        let rendered = report.render().into_string();
        assert!(rendered.contains("<h2>Overview</h2>"));
        assert!(rendered.contains("hello report"));
        assert!(rendered.contains("plot-0-1"));
        assert!(rendered.contains(PLOTLY_CDN));
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/report.html");
        Report::new("mlvis", "0.1.0", "Empty").save_to_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn json_block_escapes_markup() {
        let block = json_block(&serde_json::json!({"k": "<b>"})).unwrap().into_string();
        assert!(block.contains("&lt;b&gt;"));
    }
}
